use std::ops::Index;

use storage::models::StoredResult;
use tracing::warn;

use super::anomaly::{AnomalySink, IgnoredEntries};
use super::record::{ParsedRecord, Record};
use crate::error::Result;
use crate::scraping::BestlistTable;

/// Records of one bestlist or of its stored counterpart.
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    records: Vec<Record>,
}

impl RecordCollection {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parses every row of `table`. Invalid rows are left out; the ones not yet triaged are
    /// appended to `anomalies`.
    pub fn from_table(
        table: &BestlistTable,
        anomalies: &AnomalySink,
        ignored: &IgnoredEntries,
    ) -> Result<Self> {
        ParsedRecord::check_columns(table)?;

        let mut records = Vec::with_capacity(table.len());
        let mut reported = Vec::new();
        for row in 0..table.len() {
            match ParsedRecord::from_row(table, row).validate() {
                Ok(record) => records.push(record),
                Err(_) => {
                    let key = table.row_json(row)?;
                    if !ignored.contains(&key) {
                        reported.push(key);
                    }
                }
            }
        }

        if !reported.is_empty() {
            warn!("Found {} invalid records.", reported.len());
            anomalies.append(&reported)?;
        }

        Ok(Self { records })
    }

    pub fn from_stored(results: &[StoredResult]) -> Self {
        Self {
            records: results.iter().map(Record::from_stored).collect(),
        }
    }

    /// Stable sort by performance (best first), then date, athlete, event and rank.
    pub fn sort(&mut self, ascending: bool) {
        self.records
            .sort_by(|a, b| a.sort_key(ascending).cmp(&b.sort_key(ascending)));
    }

    /// Whether performances are ordered best to worst.
    pub fn sanity_check(&self, ascending: bool) -> bool {
        self.records.windows(2).all(|pair| {
            if ascending {
                pair[0].performance <= pair[1].performance
            } else {
                pair[0].performance >= pair[1].performance
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl Index<usize> for RecordCollection {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
