use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{CartLine, Product},
    stores::events::Notifier,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CartEvent {
    LineChanged { product_id: Uuid, quantity: u32 },
    LineRemoved { product_id: Uuid },
    Cleared,
}

/// Result of an add-to-cart attempt, reported back to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    Added,
    Incremented,
    AtStockLimit,
    OutOfStock,
}

impl AddOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AddOutcome::Added | AddOutcome::Incremented)
    }
}

#[derive(Debug, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
    events: Notifier<CartEvent>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, l| count.saturating_add(l.quantity))
    }

    pub fn quantity_of(&self, product_id: Uuid) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map(|l| l.quantity)
    }

    /// Inserts the product with quantity 1, or bumps an existing line by one
    /// while staying within the product's stock.
    pub fn add(&mut self, product: &Product) -> AddOutcome {
        if product.stock == 0 {
            self.remove(product.id);
            return AddOutcome::OutOfStock;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.product = product.clone();
            if line.quantity >= product.stock {
                line.quantity = product.stock;
                return AddOutcome::AtStockLimit;
            }
            line.quantity += 1;
            let quantity = line.quantity;
            self.events.notify(CartEvent::LineChanged {
                product_id: product.id,
                quantity,
            });
            return AddOutcome::Incremented;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
        self.events.notify(CartEvent::LineChanged {
            product_id: product.id,
            quantity: 1,
        });
        AddOutcome::Added
    }

    /// Clamps to `[1, stock]`; a request below 1 (or a sold-out product) drops the line.
    pub fn set_quantity(&mut self, product_id: Uuid, quantity: i64) {
        let Some(idx) = self.lines.iter().position(|l| l.product.id == product_id) else {
            return;
        };
        let stock = i64::from(self.lines[idx].product.stock);
        let clamped = quantity.min(stock);
        if clamped < 1 {
            self.lines.remove(idx);
            self.events.notify(CartEvent::LineRemoved { product_id });
            return;
        }
        // clamped is within 1..=u32::MAX here
        let clamped = u32::try_from(clamped).unwrap_or(u32::MAX);
        self.lines[idx].quantity = clamped;
        self.events.notify(CartEvent::LineChanged {
            product_id,
            quantity: clamped,
        });
    }

    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product.id != product_id);
        let removed = self.lines.len() != before;
        if removed {
            self.events.notify(CartEvent::LineRemoved { product_id });
        }
        removed
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, l| total.saturating_add(l.line_total()))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.events.notify(CartEvent::Cleared);
    }
}
