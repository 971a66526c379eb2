use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No accounts found: expected at least one {prefix}_ACCOUNT_SID_<suffix> / {prefix}_AUTH_TOKEN_<suffix> pair")]
    NoAccounts {
        prefix: String
    },
    #[error("Account prefix [{prefix}] cannot be used to match configuration keys: {source}")]
    InvalidPrefix {
        prefix: String,
        #[source]
        source: regex::Error
    }
}
