use std::fmt;
use std::fmt::{Debug, Formatter};

const MASKED_PREFIX_LENGTH: usize = 10;

/// One configured account to export, as found by account discovery.
#[derive(Clone, Eq, PartialEq)]
pub struct AccountCredential {
    /// The remote account identifier, also used to name the output file.
    pub account_id: String,
    /// The secret paired with the account identifier.
    pub secret: String,
    /// The configuration key suffix that tied the identifier and secret together.
    pub discovery_suffix: String
}

impl AccountCredential {
    pub fn new(account_id: impl Into<String>, secret: impl Into<String>, discovery_suffix: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            secret: secret.into(),
            discovery_suffix: discovery_suffix.into()
        }
    }

    /// The identifier shortened for display in logs and the run summary.
    pub fn masked_id(&self) -> String {
        mask_account_id(&self.account_id)
    }
}

//NOTE: Keeps the secret out of any accidental `{:?}` in a log line.
impl Debug for AccountCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("AccountCredential")
            .field("account_id", &self.masked_id())
            .field("discovery_suffix", &self.discovery_suffix)
            .finish_non_exhaustive()
    }
}

pub fn mask_account_id(account_id: &str) -> String {
    let prefix: String = account_id.chars().take(MASKED_PREFIX_LENGTH).collect();
    format!("{prefix}...")
}
