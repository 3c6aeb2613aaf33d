/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: API key 検証, inference: provider client, api_prefix: 認証対象の path prefix
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::Authenticator, inference::InferenceClient};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Authenticator>,
    pub inference: Arc<dyn InferenceClient>,
    pub api_prefix: Arc<str>,
}

impl AppState {
    pub fn new(
        auth: Arc<Authenticator>,
        inference: Arc<dyn InferenceClient>,
        api_prefix: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            auth,
            inference,
            api_prefix: api_prefix.into(),
        }
    }
}
