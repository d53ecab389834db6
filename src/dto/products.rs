use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{NewProduct, Product, ProductPatch},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    #[schema(value_type = String, example = "1000.00")]
    pub price: Decimal,
    pub stock: u32,
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, AppError> {
        let name = required("name", self.name)?;
        let category = required("category", self.category)?;
        Ok(NewProduct {
            name,
            category,
            price: price(self.price)?,
            stock: stock(self.stock)?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl UpdateProductRequest {
    pub fn validate(self) -> Result<ProductPatch, AppError> {
        let name = self.name.map(|n| required("name", n)).transpose()?;
        let category = self.category.map(|c| required("category", c)).transpose()?;
        Ok(ProductPatch {
            name,
            category,
            price: self.price.map(price).transpose()?,
            stock: self.stock.map(stock).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub stock: u32,
}

impl UpdateStockRequest {
    pub fn validate(self) -> Result<u32, AppError> {
        stock(self.stock)
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

fn required(field: &str, value: String) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Prices are stored as `NUMERIC(12, 2)`: at most two decimal places and ten
/// integer digits.
pub const MAX_PRICE_SCALE: u32 = 2;
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

fn price(value: Decimal) -> Result<Decimal, AppError> {
    let value = value.normalize();
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if value.scale() > MAX_PRICE_SCALE {
        return Err(AppError::BadRequest(format!(
            "price must have at most {MAX_PRICE_SCALE} decimal places"
        )));
    }
    if value >= PRICE_LIMIT {
        return Err(AppError::BadRequest(format!("price must be below {PRICE_LIMIT}")));
    }
    Ok(value)
}

// The products table stores stock as INTEGER.
fn stock(value: u32) -> Result<u32, AppError> {
    if i32::try_from(value).is_err() {
        return Err(AppError::BadRequest(format!(
            "stock must not exceed {}",
            i32::MAX
        )));
    }
    Ok(value)
}
