use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::cart::CartView,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, User},
    navigation::{Navigation, Page, resolve},
    response::{ApiResponse, Meta},
    state::{AppState, Shop},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/", get(catalog_page))
        .route("/cart", get(cart_page))
        .route("/checkout", get(checkout_page))
        .route("/admin", get(admin_page))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminSummary {
    pub products: usize,
    pub sales: usize,
    pub users: usize,
    pub low_stock: usize,
}

/// What a screen needs to draw itself.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum PageView {
    Login,
    Catalog { user: User, products: Vec<Product>, cart_items: u32 },
    Cart { user: User, cart: CartView },
    Checkout { user: User, cart: CartView },
    Admin { user: User, summary: AdminSummary },
}

async fn show(state: &AppState, page: Page, user: Option<AuthUser>) -> AppResult<Response> {
    match resolve(page, user.as_ref().map(|u| u.role)) {
        Navigation::Redirect(target) => {
            tracing::debug!(from = page.path(), to = target.path(), "page redirect");
            Ok(Redirect::to(target.path()).into_response())
        }
        Navigation::Render(page) => {
            let shop = state.shop.lock().await;
            let view = build_view(&shop, page, user)?;
            Ok(Json(ApiResponse::success(page.path(), view, Some(Meta::empty()))).into_response())
        }
    }
}

fn build_view(shop: &Shop, page: Page, user: Option<AuthUser>) -> AppResult<PageView> {
    let Some(auth) = user else {
        return Ok(PageView::Login);
    };
    let cart = shop
        .sessions
        .live(auth.session_id, chrono::Utc::now())
        .map(|session| CartView::from(&session.cart))
        .ok_or_else(|| AppError::Unauthorized("Session has ended".into()))?;
    let user = User {
        id: auth.user_id,
        username: auth.username,
        role: auth.role,
    };

    Ok(match page {
        Page::Login => PageView::Login,
        Page::Catalog => PageView::Catalog {
            user,
            products: shop.catalog.search(""),
            cart_items: cart.item_count,
        },
        Page::Cart => PageView::Cart { user, cart },
        Page::Checkout => PageView::Checkout { user, cart },
        Page::Admin => PageView::Admin {
            user,
            summary: AdminSummary {
                products: shop.catalog.len(),
                sales: shop.ledger.len(),
                users: shop.users.records().len(),
                low_stock: shop.catalog.low_stock(10).len(),
            },
        },
    })
}

#[utoipa::path(
    get,
    path = "/login",
    responses((status = 200, description = "Login screen", body = ApiResponse<PageView>)),
    tag = "Pages"
)]
pub async fn login_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Response> {
    show(&state, Page::Login, user).await
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Storefront", body = ApiResponse<PageView>),
        (status = 303, description = "Redirect to /login"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn catalog_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Response> {
    show(&state, Page::Catalog, user).await
}

#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "Cart screen", body = ApiResponse<PageView>),
        (status = 303, description = "Redirect to /login"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn cart_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Response> {
    show(&state, Page::Cart, user).await
}

#[utoipa::path(
    get,
    path = "/checkout",
    responses(
        (status = 200, description = "Checkout screen", body = ApiResponse<PageView>),
        (status = 303, description = "Redirect to /login"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn checkout_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Response> {
    show(&state, Page::Checkout, user).await
}

#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Admin panel", body = ApiResponse<PageView>),
        (status = 303, description = "Redirect to /login or /"),
    ),
    security(("bearer_auth" = [])),
    tag = "Pages"
)]
pub async fn admin_page(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Response> {
    show(&state, Page::Admin, user).await
}
