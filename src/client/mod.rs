mod errors;
#[cfg(test)]
mod tests;
mod usage_client;

use futures::stream::BoxStream;

use crate::models::{AccountCredential, UsageRecord};

pub use errors::ClientError;
pub use usage_client::{UsageClient, DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE};

/// A lazily paginated source of monthly usage records for one account.
///
/// The stream yields records in the remote collection's natural order and ends
/// after the first error. Re-invoking starts over from the first page.
pub trait UsageSource: Send + Sync + 'static {
    fn monthly_records(&self, credential: AccountCredential) -> BoxStream<'static, Result<UsageRecord, ClientError>>;
}
