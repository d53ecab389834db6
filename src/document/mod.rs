//! Printable documents (receipts and sales reports).
//!
//! Workflows build a [`Document`] out of plain rows and totals; a
//! [`DocumentRenderer`] turns it into bytes. Nothing in here knows about sales
//! or carts.

pub mod pdf;

use thiserror::Error;

pub use pdf::PdfRenderer;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub heading: String,
    pub lines: Vec<String>,
    pub table: Option<Table>,
    pub footer: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Header, rule and rows padded to common column widths.
    pub fn to_text_lines(&self) -> Vec<String> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(idx) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let format_row = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(idx, width)| {
                    let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                    format!("{cell:<width$}")
                })
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format_row(&self.columns));
        let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        lines.push("-".repeat(rule_len));
        for row in &self.rows {
            lines.push(format_row(row));
        }
        lines
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("document has no pages")]
    Empty,

    #[error("failed to write document: {0}")]
    Write(#[from] std::fmt::Error),
}

pub trait DocumentRenderer: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn file_extension(&self) -> &'static str;

    fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError>;
}
