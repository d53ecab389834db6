use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    /// Whether the catalog is written through to Postgres.
    pub database: bool,
    pub products: usize,
    pub sales: usize,
    pub active_sessions: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let shop = state.shop.lock().await;
    let data = HealthData {
        status: "ok".to_string(),
        database: state.orm.is_some(),
        products: shop.catalog.len(),
        sales: shop.ledger.len(),
        active_sessions: shop.sessions.active_count(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}
