//! Process environment access as an injectable capability.
//!
//! Values that must be re-read on every call (the API key allow-list) go
//! through [`ReadEnv`] instead of `std::env` so tests can supply their own
//! values without touching the process environment.
use std::env;

pub trait ReadEnv: Send + Sync {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Delegates to `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// In-memory environment for tests. Values can be changed after construction.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemEnv {
    vars: std::sync::RwLock<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let env = Self::new();
        env.set(key, value);
        env
    }

    pub fn set(&self, key: &str, value: &str) {
        self.vars
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove(&self, key: &str) {
        self.vars.write().unwrap().remove(key);
    }
}

#[cfg(test)]
impl ReadEnv for MemEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}
