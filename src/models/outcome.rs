use std::fmt;
use std::fmt::{Display, Formatter};

use crate::models::credential::mask_account_id;

/// The terminal result of one account's export pipeline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExportOutcome {
    pub account_id: String,
    pub success: bool,
    /// Rows written to the account's file, including those written before a failure.
    pub total_records: usize,
    pub error: Option<String>
}

impl ExportOutcome {
    pub fn succeeded(account_id: impl Into<String>, total_records: usize) -> Self {
        Self {
            account_id: account_id.into(),
            success: true,
            total_records,
            error: None
        }
    }

    pub fn failed(account_id: impl Into<String>, total_records: usize, error: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            success: false,
            total_records,
            error: Some(error.into())
        }
    }
}

impl Display for ExportOutcome {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let account = mask_account_id(&self.account_id);

        if self.success {
            write!(formatter, "✅ Account {account}: {} records", self.total_records)
        } else {
            write!(formatter, "❌ Account {account}: Failed - {}", self.error.as_deref().unwrap_or("unknown error"))
        }
    }
}
