use serde_json::{Map, Value};

use super::BestlistColumn;
use crate::error::{Result, SyncError};

/// A scraped bestlist: header-tagged rows of untyped strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BestlistTable {
    headers: Vec<BestlistColumn>,
    rows: Vec<Vec<String>>,
}

impl BestlistTable {
    pub fn new(headers: Vec<BestlistColumn>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(SyncError::ScrapeError(format!(
                "Row has {} values but the table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[BestlistColumn] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, column: BestlistColumn) -> bool {
        self.headers.contains(&column)
    }

    pub fn value(&self, row: usize, column: BestlistColumn) -> Option<&str> {
        let index = self.headers.iter().position(|c| *c == column)?;
        self.rows.get(row).map(|values| values[index].as_str())
    }

    /// The same table without `column`.
    pub fn without(mut self, column: BestlistColumn) -> Self {
        if let Some(index) = self.headers.iter().position(|c| *c == column) {
            self.headers.remove(index);
            for row in &mut self.rows {
                row.remove(index);
            }
        }
        self
    }

    /// One row as a JSON object in header order. Stable across runs, so it doubles as the key
    /// of an anomaly.
    pub fn row_json(&self, row: usize) -> Result<String> {
        let values = self.rows.get(row).ok_or_else(|| {
            SyncError::ScrapeError(format!("Row {} is out of range", row))
        })?;

        let object: Map<String, Value> = self
            .headers
            .iter()
            .zip(values)
            .map(|(column, value)| (column.header().to_string(), Value::String(value.clone())))
            .collect();

        Ok(serde_json::to_string(&object)?)
    }
}
