use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeDelta, Utc};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    models::{Sale, SaleItem},
    stores::events::Notifier,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    SaleRecorded(Sale),
}

/// A sale before it enters the ledger. The total is derived from the items on append.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub date: Option<DateTime<Utc>>,
    pub payment_method: String,
    pub items: Vec<SaleItem>,
}

/// Append-only record of completed sales.
///
/// Calendar queries (day, week, month) are evaluated in the ledger's fixed
/// offset; weeks run Sunday through Saturday.
#[derive(Debug)]
pub struct SalesLedger {
    sales: Vec<Sale>,
    offset: FixedOffset,
    events: Notifier<LedgerEvent>,
}

impl Default for SalesLedger {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

impl SalesLedger {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            sales: Vec::new(),
            offset,
            events: Notifier::new(),
        }
    }

    pub fn from_sales(mut sales: Vec<Sale>, offset: FixedOffset) -> Self {
        sales.sort_by_key(|s| s.date);
        Self {
            sales,
            offset,
            events: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    pub fn append(&mut self, new: NewSale) -> Sale {
        let total = new
            .items
            .iter()
            .fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_total()));
        let sale = Sale {
            id: Uuid::new_v4(),
            date: new.date.unwrap_or_else(Utc::now),
            total,
            payment_method: new.payment_method,
            items: new.items,
        };
        self.sales.push(sale.clone());
        self.events.notify(LedgerEvent::SaleRecorded(sale.clone()));
        sale
    }

    /// Calendar date of a sale in the ledger's offset.
    pub fn local_date(&self, sale: &Sale) -> NaiveDate {
        sale.date.with_timezone(&self.offset).date_naive()
    }

    /// First instant of `date` in the ledger's offset.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        (local_midnight - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// Last instant of `date` in the ledger's offset.
    pub fn day_end(&self, date: NaiveDate) -> DateTime<Utc> {
        self.day_start(date) + TimeDelta::days(1) - TimeDelta::nanoseconds(1)
    }

    /// Sales with `start <= date <= end`.
    pub fn range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| s.date >= start && s.date <= end)
            .collect()
    }

    pub fn daily(&self, date: NaiveDate) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| self.local_date(s) == date)
            .collect()
    }

    pub fn weekly(&self, date: NaiveDate) -> Vec<&Sale> {
        let (first, last) = week_bounds(date);
        self.sales
            .iter()
            .filter(|s| {
                let day = self.local_date(s);
                day >= first && day <= last
            })
            .collect()
    }

    pub fn monthly(&self, date: NaiveDate) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| {
                let day = self.local_date(s);
                day.year() == date.year() && day.month() == date.month()
            })
            .collect()
    }

    /// Units sold per product id across sales in `[start, end]`.
    pub fn product_frequency(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> BTreeMap<Uuid, u32> {
        let mut frequency = BTreeMap::new();
        for sale in self.range(start, end) {
            for item in &sale.items {
                *frequency.entry(item.product.id).or_insert(0) += item.quantity;
            }
        }
        frequency
    }

    /// Transaction lookup by local date (`2024-03-05` or `3/5/2024`) or product name.
    pub fn search(&self, term: &str) -> Vec<&Sale> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.sales.iter().collect();
        }
        self.sales
            .iter()
            .filter(|s| {
                let day = self.local_date(s);
                day.format("%Y-%m-%d").to_string().contains(&term)
                    || day.format("%-m/%-d/%Y").to_string().contains(&term)
                    || s.items
                        .iter()
                        .any(|i| i.product.name.to_lowercase().contains(&term))
            })
            .collect()
    }
}

/// Sunday and Saturday of the calendar week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = i64::from(date.weekday().num_days_from_sunday());
    let first = date - TimeDelta::days(back);
    (first, first + TimeDelta::days(6))
}
