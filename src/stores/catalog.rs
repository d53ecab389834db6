use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    models::{NewProduct, Product, ProductPatch},
    stores::events::Notifier,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Added(Product),
    Updated(Product),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("product {0} not found")]
    UnknownProduct(Uuid),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: Uuid,
        requested: u32,
        available: u32,
    },
}

/// The sellable items, keyed by id. Insertion order is preserved.
#[derive(Debug, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
    events: Notifier<CatalogEvent>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            events: Notifier::new(),
        }
    }

    pub fn demo() -> Self {
        let seed = [
            ("Apple", "Fruit", 1000, 100),
            ("Banana", "Fruit", 500, 150),
            ("Milk", "Dairy", 1500, 50),
        ];
        Self::with_products(
            seed.into_iter()
                .map(|(name, category, price, stock)| Product {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                    category: category.to_string(),
                    price: Decimal::from(price),
                    stock,
                })
                .collect(),
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Case-insensitive substring match on name or category, always against
    /// the full catalog. A blank term yields every product.
    pub fn search(&self, term: &str) -> Vec<Product> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.products.clone();
        }
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term) || p.category.to_lowercase().contains(&term)
            })
            .cloned()
            .collect()
    }

    pub fn add(&mut self, new: NewProduct) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            category: new.category,
            price: new.price,
            stock: new.stock,
        };
        self.insert(product.clone());
        product
    }

    /// Adds a product that already has an id, replacing any entry with the same id.
    pub fn insert(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => {
                *existing = product.clone();
                self.events.notify(CatalogEvent::Updated(product));
            }
            None => {
                self.products.push(product.clone());
                self.events.notify(CatalogEvent::Added(product));
            }
        }
    }

    pub fn update(&mut self, id: Uuid, patch: ProductPatch) -> Option<Product> {
        let product = self.products.iter_mut().find(|p| p.id == id)?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        let updated = product.clone();
        self.events.notify(CatalogEvent::Updated(updated.clone()));
        Some(updated)
    }

    pub fn set_stock(&mut self, id: Uuid, stock: u32) -> Option<Product> {
        self.update(
            id,
            ProductPatch {
                stock: Some(stock),
                ..ProductPatch::default()
            },
        )
    }

    pub fn ensure_available(&self, id: Uuid, requested: u32) -> Result<&Product, StockError> {
        let product = self.get(id).ok_or(StockError::UnknownProduct(id))?;
        if product.stock < requested {
            return Err(StockError::Insufficient {
                product_id: id,
                requested,
                available: product.stock,
            });
        }
        Ok(product)
    }

    /// Decrements stock only when at least `requested` units are on hand.
    pub fn decrement_stock(&mut self, id: Uuid, requested: u32) -> Result<Product, StockError> {
        let remaining = self.ensure_available(id, requested)?.stock - requested;
        self.set_stock(id, remaining)
            .ok_or(StockError::UnknownProduct(id))
    }

    pub fn low_stock(&self, threshold: u32) -> Vec<Product> {
        let mut items: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.stock <= threshold)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));
        items
    }
}
