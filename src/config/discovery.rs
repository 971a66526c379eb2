use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::errors::ConfigError;
use crate::config::ConfigSource;
use crate::models::{mask_account_id, AccountCredential};

/// Finds every `<PREFIX>_ACCOUNT_SID_<suffix>` key with a matching, non-empty
/// `<PREFIX>_AUTH_TOKEN_<suffix>` sibling.
///
/// The order of the returned credentials follows the source's enumeration order
/// and carries no meaning. An account identifier configured under several
/// suffixes is returned once, since every account owns a single output file.
///
/// # Errors
/// Returns `ConfigError::NoAccounts` if no complete pair is found.
pub fn discover_accounts<C: ConfigSource + ?Sized>(source: &C, prefix: &str) -> Result<Vec<AccountCredential>, ConfigError> {
    let pattern = format!(r"^{}_ACCOUNT_SID_(\w+)$", regex::escape(prefix));
    let matcher = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPrefix {
        prefix: prefix.to_string(),
        source
    })?;

    let mut accounts = Vec::new();
    let mut seen_account_ids = HashSet::new();

    for (key, account_id) in source.entries() {
        let Some(captures) = matcher.captures(&key) else {
            continue;
        };

        let suffix = &captures[1];

        if account_id.is_empty() {
            warn!("Configuration key [{key}] is empty, skipping");
            continue;
        }

        let token_key = format!("{prefix}_AUTH_TOKEN_{suffix}");

        match source.get(&token_key) {
            Some(secret) if !secret.is_empty() => {
                if !seen_account_ids.insert(account_id.clone()) {
                    warn!("Account [{}] is configured again under suffix [{suffix}], skipping", mask_account_id(&account_id));
                    continue;
                }

                debug!("Discovered account [{}] from suffix [{suffix}]", mask_account_id(&account_id));
                accounts.push(AccountCredential::new(account_id, secret, suffix));
            }
            _ => {
                warn!("Account [{}] has no {token_key} value, skipping", mask_account_id(&account_id));
            }
        }
    }

    if accounts.is_empty() {
        return Err(ConfigError::NoAccounts { prefix: prefix.to_string() });
    }

    Ok(accounts)
}
