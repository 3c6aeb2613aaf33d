//! API key allow-list, sourced from `API_KEYS` (comma-separated).
//!
//! The list is read on every call; there is no cache and no startup check.
use crate::config::split_list;
use crate::services::env::ReadEnv;

pub const API_KEYS_VAR: &str = "API_KEYS";

/// Returns the configured API keys, trimmed, without empty entries.
/// An unset variable yields an empty list.
pub fn valid_api_keys<E: ReadEnv + ?Sized>(env: &E) -> Vec<String> {
    match env.var(API_KEYS_VAR) {
        Ok(raw) => split_list(&raw),
        Err(_) => Vec::new(),
    }
}

/// Exact membership check. An empty allow-list never matches.
pub fn is_valid_api_key<E: ReadEnv + ?Sized>(env: &E, api_key: &str) -> bool {
    let keys = valid_api_keys(env);
    if keys.is_empty() {
        return false;
    }
    keys.iter().any(|k| k == api_key)
}
