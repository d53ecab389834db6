use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest, UpdateStockRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    repository,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_products(state: &AppState, q: Option<&str>) -> AppResult<ApiResponse<ProductList>> {
    let shop = state.shop.lock().await;
    let items = shop.catalog.search(q.unwrap_or_default());
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let shop = state.shop.lock().await;
    let product = shop.catalog.get(id).cloned().ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let new_product = payload.validate()?;

    let mut shop = state.shop.lock().await;
    let product = shop.catalog.add(new_product);
    if let Some(conn) = &state.orm {
        repository::insert_product(conn, &product).await?;
    }
    state.persist_catalog(&shop).await?;

    log_audit(
        Some(user),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    );

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let patch = payload.validate()?;
    if patch.is_empty() {
        return Err(AppError::BadRequest("nothing to update".into()));
    }

    let mut shop = state.shop.lock().await;
    let product = shop.catalog.update(id, patch).ok_or(AppError::NotFound)?;
    write_through(state, &product).await?;
    state.persist_catalog(&shop).await?;

    log_audit(
        Some(user),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    );

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn set_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStockRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let stock = payload.validate()?;

    let mut shop = state.shop.lock().await;
    let product = shop.catalog.set_stock(id, stock).ok_or(AppError::NotFound)?;
    if let Some(conn) = &state.orm {
        if repository::set_stock(conn, id, stock).await?.is_none() {
            tracing::warn!(product_id = %id, "product missing from products table, stock not mirrored");
        }
    }
    state.persist_catalog(&shop).await?;

    log_audit(
        Some(user),
        "stock_update",
        "products",
        serde_json::json!({ "product_id": product.id, "stock": product.stock }),
    );

    Ok(ApiResponse::success("Stock updated", product, Some(Meta::empty())))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    threshold: Option<u32>,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let shop = state.shop.lock().await;
    let items = shop.catalog.low_stock(threshold.unwrap_or(10));
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Low stock", ProductList { items }, Some(meta)))
}

/// Mirrors a catalog change into the products table when a database is configured.
pub(crate) async fn write_through(state: &AppState, product: &Product) -> AppResult<()> {
    if let Some(conn) = &state.orm {
        repository::save_product(conn, product).await?;
    }
    Ok(())
}
