use chrono::Utc;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::checkout::{CheckoutRequest, CheckoutResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta, RenderedDocument},
    services::product_service::write_through,
    state::AppState,
    workflow::{place_order, receipt_document},
};

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let mut guard = state.shop.lock().await;
    let shop = &mut *guard;
    let cart = shop
        .sessions
        .cart_mut(user.session_id)
        .ok_or_else(|| AppError::Unauthorized("Session has ended".into()))?;

    let sale = match place_order(
        cart,
        &mut shop.catalog,
        &mut shop.ledger,
        &payload.payment_method,
        Utc::now(),
    ) {
        Ok(sale) => sale,
        Err(err) => {
            tracing::warn!(user_id = %user.user_id, error = %err, "checkout rejected");
            return Err(err.into());
        }
    };

    for item in &sale.items {
        if let Some(product) = shop.catalog.get(item.product.id) {
            write_through(state, product).await?;
        }
    }
    state.persist_sales(shop).await?;
    state.persist_catalog(shop).await?;

    tracing::info!(
        sale_id = %sale.id,
        total = %sale.total,
        lines = sale.items.len(),
        "checkout completed"
    );
    log_audit(
        Some(user),
        "checkout",
        "sales",
        serde_json::json!({ "sale_id": sale.id, "total": sale.total }),
    );

    let receipt_url = format!("/api/sales/{}/receipt", sale.id);
    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse { sale, receipt_url },
        Some(Meta::empty()),
    ))
}

pub async fn receipt(state: &AppState, sale_id: Uuid) -> AppResult<RenderedDocument> {
    let shop = state.shop.lock().await;
    let sale = shop.ledger.get(sale_id).ok_or(AppError::NotFound)?;
    let document = receipt_document(sale, &state.config.currency, state.offset);
    let bytes = state.renderer.render(&document)?;
    Ok(RenderedDocument {
        content_type: state.renderer.content_type(),
        file_name: format!("receipt-{}.{}", sale.id, state.renderer.file_extension()),
        bytes,
    })
}
