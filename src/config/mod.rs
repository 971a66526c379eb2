mod discovery;
mod errors;

use std::collections::HashMap;

pub use discovery::discover_accounts;
pub use errors::ConfigError;

/// A read-only view of key/value configuration, such as the process environment.
pub trait ConfigSource {
    fn entries(&self) -> Vec<(String, String)>;
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads configuration from the process environment.
pub struct EnvironmentSource;

impl ConfigSource for EnvironmentSource {
    fn entries(&self) -> Vec<(String, String)> {
        //NOTE: vars_os skips keys/values that are not valid unicode instead of panicking like vars
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn entries(&self) -> Vec<(String, String)> {
        self.iter().map(|(key, value)| (key.clone(), value.clone())).collect()
    }

    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
