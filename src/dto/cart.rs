use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::CartLine,
    stores::{AddOutcome, CartStore},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartQuantityRequest {
    /// Values below 1 remove the line; values above stock are clamped.
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    #[schema(value_type = String)]
    pub total: Decimal,
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AddToCartResponse {
    pub outcome: AddOutcome,
    pub cart: CartView,
}
