use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    document::{Document, Page, Table},
    models::{Sale, SaleItem},
    stores::{CartStore, CatalogStore, NewSale, SalesLedger, StockError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("payment method is required")]
    MissingPaymentMethod,

    #[error("product {0} is no longer in the catalog")]
    UnknownProduct(Uuid),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("order total exceeds the largest representable amount")]
    TotalOutOfRange,
}

impl From<StockError> for CheckoutError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::UnknownProduct(id) => CheckoutError::UnknownProduct(id),
            StockError::Insufficient {
                product_id,
                requested,
                available,
            } => CheckoutError::InsufficientStock {
                product_id,
                requested,
                available,
            },
        }
    }
}

/// Turns the cart into a sale.
///
/// Every line is checked against the catalog's current stock, and the total
/// against overflow, before anything changes, so a failed checkout leaves cart, ledger and catalog untouched.
/// On success the sale is appended, stock is decremented and the cart cleared.
/// Item prices come from the cart lines, i.e. what the shopper saw.
pub fn place_order(
    cart: &mut CartStore,
    catalog: &mut CatalogStore,
    ledger: &mut SalesLedger,
    payment_method: &str,
    now: DateTime<Utc>,
) -> Result<Sale, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let payment_method = payment_method.trim();
    if payment_method.is_empty() {
        return Err(CheckoutError::MissingPaymentMethod);
    }

    for line in cart.lines() {
        catalog.ensure_available(line.product.id, line.quantity)?;
    }

    let items: Vec<SaleItem> = cart
        .lines()
        .iter()
        .map(|line| SaleItem {
            product: line.product.clone(),
            quantity: line.quantity,
            price: line.product.price,
        })
        .collect();

    items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| {
            item.checked_line_total()
                .and_then(|amount| total.checked_add(amount))
        })
        .ok_or(CheckoutError::TotalOutOfRange)?;

    for item in &items {
        catalog.decrement_stock(item.product.id, item.quantity)?;
    }

    let sale = ledger.append(NewSale {
        date: Some(now),
        payment_method: payment_method.to_string(),
        items,
    });
    cart.clear();
    Ok(sale)
}

/// Printable receipt for a completed sale.
pub fn receipt_document(sale: &Sale, currency: &str, offset: FixedOffset) -> Document {
    let mut table = Table::new(["Item", "Qty", "Unit price", "Amount"]);
    for item in &sale.items {
        table.push_row([
            item.product.name.clone(),
            item.quantity.to_string(),
            money(currency, item.price),
            money(currency, item.line_total()),
        ]);
    }

    let local = sale.date.with_timezone(&offset);
    Document {
        title: format!("Receipt {}", sale.id),
        pages: vec![Page {
            heading: "Receipt".to_string(),
            lines: vec![
                format!("Date: {}", local.format("%Y-%m-%d %H:%M:%S")),
                format!("Sale ID: {}", sale.id),
                "Items:".to_string(),
            ],
            table: Some(table),
            footer: vec![
                format!("Total: {}", money(currency, sale.total)),
                format!("Payment Method: {}", sale.payment_method),
            ],
        }],
    }
}

pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{currency} {:.2}", amount)
}
