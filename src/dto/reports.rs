use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    models::Sale,
    workflow::{ReportKind, ReportRequest},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub start: NaiveDate,
    /// Required for `custom` reports.
    pub end: Option<NaiveDate>,
}

impl From<ReportQuery> for ReportRequest {
    fn from(query: ReportQuery) -> Self {
        ReportRequest {
            kind: query.kind,
            start: query.start,
            end: query.end,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SaleList {
    #[schema(value_type = Vec<Sale>)]
    pub items: Vec<Sale>,
}
