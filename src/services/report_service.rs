use crate::{
    dto::reports::{ReportQuery, SaleList},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta, RenderedDocument},
    state::AppState,
    workflow::{ReportRequest, SalesReport, build_report},
};

pub async fn list_sales(
    state: &AppState,
    user: &AuthUser,
    q: Option<&str>,
) -> AppResult<ApiResponse<SaleList>> {
    ensure_admin(user)?;
    let shop = state.shop.lock().await;
    let items: Vec<_> = shop
        .ledger
        .search(q.unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    let meta = Meta::count(items.len());
    Ok(ApiResponse::success("Sales", SaleList { items }, Some(meta)))
}

pub async fn report_summary(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<ApiResponse<SalesReport>> {
    ensure_admin(user)?;
    let request = ReportRequest::from(query);
    let shop = state.shop.lock().await;
    let report = build_report(&shop.ledger, &request, state.today())?;
    let meta = Meta::count(report.sales.len());
    Ok(ApiResponse::success(report.title.clone(), report, Some(meta)))
}

pub async fn report_document(
    state: &AppState,
    user: &AuthUser,
    query: ReportQuery,
) -> AppResult<RenderedDocument> {
    ensure_admin(user)?;
    let request = ReportRequest::from(query);
    let shop = state.shop.lock().await;
    let report = build_report(&shop.ledger, &request, state.today())?;
    let document = report.to_document(&shop.ledger, &state.config.currency);
    let bytes = state.renderer.render(&document)?;

    tracing::info!(
        title = %report.title,
        sales = report.sales.len(),
        bytes = bytes.len(),
        "sales report rendered"
    );
    Ok(RenderedDocument {
        content_type: state.renderer.content_type(),
        file_name: report.file_name(state.renderer.file_extension()),
        bytes,
    })
}
