use std::mem;

use crate::models::UsageRecord;
use crate::types::MonthKey;

/// A maximal run of consecutive usage records sharing one (year, month) key.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBatch {
    pub key: MonthKey,
    pub records: Vec<UsageRecord>
}

impl MonthBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Single-record months are written but not announced in the run log.
    pub fn is_announced(&self) -> bool {
        self.records.len() > 1
    }
}

/// Splits a chronologically ordered record stream into month batches.
///
/// The grouper only detects boundaries between consecutive records; it never
/// sorts, so an out-of-order stream produces repeated keys in non-adjacent batches.
/// At most one month of records is held at a time.
#[derive(Debug, Default)]
pub struct MonthGrouper {
    current_key: Option<MonthKey>,
    pending: Vec<UsageRecord>
}

impl MonthGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record, returning the completed batch if this record starts a new month.
    pub fn push(&mut self, record: UsageRecord) -> Option<MonthBatch> {
        let key = record.month_key();
        let mut completed = None;

        match self.current_key {
            None => self.current_key = Some(key),
            Some(current_key) if current_key != key => {
                completed = Some(MonthBatch {
                    key: current_key,
                    records: mem::take(&mut self.pending)
                });
                self.current_key = Some(key);
            }
            Some(_) => {}
        }

        self.pending.push(record);

        completed
    }

    /// Flushes whatever has accumulated for the current month, leaving the grouper empty.
    pub fn finish(&mut self) -> Option<MonthBatch> {
        let key = self.current_key.take()?;

        if self.pending.is_empty() {
            return None;
        }

        Some(MonthBatch {
            key,
            records: mem::take(&mut self.pending)
        })
    }
}
