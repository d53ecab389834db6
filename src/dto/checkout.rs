use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Sale;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub payment_method: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub sale: Sale,
    /// Where the printable receipt for this sale can be fetched.
    pub receipt_url: String,
}
