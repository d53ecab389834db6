use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, AddToCartResponse, CartView, UpdateCartQuantityRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::{AppState, Shop},
    stores::CartStore,
};

fn session_cart<'a>(shop: &'a mut Shop, user: &AuthUser) -> AppResult<&'a mut CartStore> {
    shop.sessions
        .cart_mut(user.session_id)
        .ok_or_else(|| AppError::Unauthorized("Session has ended".into()))
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let mut shop = state.shop.lock().await;
    let cart = session_cart(&mut shop, user)?;
    let meta = Meta::count(cart.lines().len());
    Ok(ApiResponse::success("OK", CartView::from(&*cart), Some(meta)))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<AddToCartResponse>> {
    let mut guard = state.shop.lock().await;
    let shop = &mut *guard;
    let product = shop
        .catalog
        .get(payload.product_id)
        .cloned()
        .ok_or(AppError::NotFound)?;
    let cart = session_cart(shop, user)?;
    let outcome = cart.add(&product);

    tracing::debug!(product_id = %product.id, ?outcome, "add to cart");
    let message = if outcome.is_success() {
        "Added to cart"
    } else {
        "Could not add to cart"
    };
    Ok(ApiResponse::success(
        message,
        AddToCartResponse {
            outcome,
            cart: CartView::from(&*cart),
        },
        None,
    ))
}

pub async fn set_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartQuantityRequest,
) -> AppResult<ApiResponse<CartView>> {
    let mut shop = state.shop.lock().await;
    let cart = session_cart(&mut shop, user)?;
    cart.set_quantity(product_id, payload.quantity);
    Ok(ApiResponse::success("OK", CartView::from(&*cart), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let mut shop = state.shop.lock().await;
    let cart = session_cart(&mut shop, user)?;
    if !cart.remove(product_id) {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::success(
        "Removed from cart",
        CartView::from(&*cart),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let mut shop = state.shop.lock().await;
    let cart = session_cart(&mut shop, user)?;
    cart.clear();
    Ok(ApiResponse::success("Cart cleared", CartView::from(&*cart), None))
}
