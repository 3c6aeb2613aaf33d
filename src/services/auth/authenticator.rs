use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::services::auth::{bearer::extract_bearer_token, key_store::is_valid_api_key};
use crate::services::env::ReadEnv;

/// Why a request was refused by the API key check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Authorization header required")]
    Missing,
    #[error("Invalid authorization format. Use: Bearer <api-key>")]
    Malformed,
    #[error("Invalid API key")]
    Invalid,
}

impl AuthRejection {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::Invalid => "invalid",
        }
    }
}

/// Static API key authentication against the `API_KEYS` allow-list.
///
/// Configuration is read through the injected [`ReadEnv`] on every call.
#[derive(Clone)]
pub struct Authenticator {
    env: Arc<dyn ReadEnv>,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // key material is never printed
        f.debug_struct("Authenticator").finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(env: Arc<dyn ReadEnv>) -> Self {
        Self { env }
    }

    /// Classify a raw `Authorization` header value.
    ///
    /// `None` means the header was absent.
    pub fn authenticate(&self, header: Option<&str>) -> Result<(), AuthRejection> {
        let Some(token) = extract_bearer_token(header) else {
            return Err(match header {
                None => AuthRejection::Missing,
                Some(_) => AuthRejection::Malformed,
            });
        };

        if !is_valid_api_key(self.env.as_ref(), token) {
            return Err(AuthRejection::Invalid);
        }

        Ok(())
    }
}
