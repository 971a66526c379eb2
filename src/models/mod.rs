mod credential;
mod outcome;
mod usage_record;

pub use credential::{mask_account_id, AccountCredential};
pub use outcome::ExportOutcome;
pub use usage_record::UsageRecord;
