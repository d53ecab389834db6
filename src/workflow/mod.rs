//! Cross-store flows: checkout (cart → ledger → catalog) and sales reporting.

pub mod checkout;
pub mod report;

pub use checkout::{CheckoutError, place_order, receipt_document};
pub use report::{FrequencyRow, ReportError, ReportKind, ReportRequest, SalesReport, build_report};
