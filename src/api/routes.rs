/*
 * Responsibility
 * - API prefix 配下の URL 構造を定義 (prefix は app.rs で nest)
 * - API key gate は middleware::auth::access が Router 全体に掛ける (ここでは何もしない)
 */
use axum::{Router, routing::post};

use crate::state::AppState;

use crate::api::handlers::{compose::compose, proofread::proofread, transcribe::transcribe};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/compose", post(compose))
        .route("/proofread", post(proofread))
        .route("/transcribe", post(transcribe))
}
