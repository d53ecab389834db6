pub mod cart;
pub mod catalog;
pub mod events;
pub mod ledger;
pub mod sessions;
pub mod users;

pub use cart::{AddOutcome, CartEvent, CartStore};
pub use catalog::{CatalogEvent, CatalogStore, StockError};
pub use ledger::{LedgerEvent, NewSale, SalesLedger};
pub use sessions::{Session, SessionRegistry, SessionState};
pub use users::{DirectoryEvent, UserDirectory, UserRecord};
