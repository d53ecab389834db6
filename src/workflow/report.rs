use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    document::{Document, Page, Table},
    models::Sale,
    stores::SalesLedger,
    workflow::checkout::money,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("custom reports need an end date")]
    MissingEndDate,

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FrequencyRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesReport {
    pub kind: ReportKind,
    pub title: String,
    pub generated_on: NaiveDate,
    pub sales: Vec<Sale>,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    /// Units sold per product, most sold first.
    pub frequency: Vec<FrequencyRow>,
}

pub fn build_report(
    ledger: &SalesLedger,
    request: &ReportRequest,
    today: NaiveDate,
) -> Result<SalesReport, ReportError> {
    let start = request.start;
    let (sales, title) = match request.kind {
        ReportKind::Daily => (
            ledger.daily(start),
            format!("Daily Sales Report for {start}"),
        ),
        ReportKind::Weekly => (
            ledger.weekly(start),
            format!("Weekly Sales Report starting {start}"),
        ),
        ReportKind::Monthly => (
            ledger.monthly(start),
            format!("Monthly Sales Report for {}", start.format("%B %Y")),
        ),
        ReportKind::Custom => {
            let end = request.end.ok_or(ReportError::MissingEndDate)?;
            if end < start {
                return Err(ReportError::InvertedRange { start, end });
            }
            (
                ledger.range(ledger.day_start(start), ledger.day_end(end)),
                format!("Custom Sales Report from {start} to {end}"),
            )
        }
    };

    let sales: Vec<Sale> = sales.into_iter().cloned().collect();
    let total_revenue = sales.iter().map(|s| s.total).sum();
    let frequency = frequency_table(&sales);

    Ok(SalesReport {
        kind: request.kind,
        title,
        generated_on: today,
        sales,
        total_revenue,
        frequency,
    })
}

/// Aggregates by product id and labels each row with the most recent name sold under that id.
pub fn frequency_table(sales: &[Sale]) -> Vec<FrequencyRow> {
    let mut by_product: BTreeMap<Uuid, FrequencyRow> = BTreeMap::new();
    for item in sales.iter().flat_map(|s| &s.items) {
        let row = by_product
            .entry(item.product.id)
            .or_insert_with(|| FrequencyRow {
                product_id: item.product.id,
                product_name: item.product.name.clone(),
                quantity: 0,
            });
        row.product_name.clone_from(&item.product.name);
        row.quantity += item.quantity;
    }

    let mut rows: Vec<FrequencyRow> = by_product.into_values().collect();
    rows.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    rows
}

impl SalesReport {
    /// Two pages: the transactions with their total, then the frequency table.
    pub fn to_document(&self, ledger: &SalesLedger, currency: &str) -> Document {
        let mut transactions = Table::new(["Date", "Sale ID", "Products (Quantity)", "Total"]);
        for sale in &self.sales {
            let products = sale
                .items
                .iter()
                .map(|i| format!("{} ({})", i.product.name, i.quantity))
                .collect::<Vec<_>>()
                .join(", ");
            transactions.push_row([
                ledger.local_date(sale).to_string(),
                sale.id.to_string(),
                products,
                money(currency, sale.total),
            ]);
        }

        let mut frequency = Table::new(["Product Name", "Quantity Sold"]);
        for row in &self.frequency {
            frequency.push_row([row.product_name.clone(), row.quantity.to_string()]);
        }

        Document {
            title: self.title.clone(),
            pages: vec![
                Page {
                    heading: self.title.clone(),
                    lines: vec![format!("Generated on: {}", self.generated_on)],
                    table: Some(transactions),
                    footer: vec![format!("Total Sales: {}", money(currency, self.total_revenue))],
                },
                Page {
                    heading: "Product Sales Frequency".to_string(),
                    lines: Vec::new(),
                    table: Some(frequency),
                    footer: Vec::new(),
                },
            ],
        }
    }

    /// `Daily Sales Report for 2024-03-05` becomes `daily-sales-report-for-2024-03-05.pdf`.
    pub fn file_name(&self, extension: &str) -> String {
        let slug = self
            .title
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        format!("{slug}.{extension}")
    }
}
