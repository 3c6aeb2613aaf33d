/*
 * Responsibility
 * - POST /api/proofread
 * - スペル / 文法 / 句読点のみを修正する (内容は変えない)
 */
use axum::{Json, extract::State};

use crate::{
    api::{
        dto::proofread::{ProofreadRequest, ProofreadResponse},
        extractors::ValidJson,
        handlers::assist::{self, AssistTask, ProviderCall},
    },
    error::AppError,
    services::inference::ChatRequest,
    state::AppState,
};

const SYSTEM_PROMPT: &str = "You are a proofreading assistant. Please proofread the given text and correct any spelling, grammar, and punctuation errors. Return only the corrected text without explanations or formatting.";

pub struct Proofread;

impl AssistTask for Proofread {
    type Input = ProofreadRequest;
    type Output = ProofreadResponse;

    const NAME: &'static str = "proofread";
    const FAILURE_MESSAGE: &'static str = "Failed to proofread text";

    fn provider_call(input: &ProofreadRequest) -> ProviderCall {
        ProviderCall::Chat(ChatRequest {
            system_prompt: SYSTEM_PROMPT,
            user_message: format!("Please proofread this text: {}", input.text),
            temperature: 1.0,
            max_tokens: 8192,
        })
    }

    fn respond(input: ProofreadRequest, content: String) -> ProofreadResponse {
        ProofreadResponse {
            original_text: input.text,
            proofread_text: content.trim().to_string(),
        }
    }
}

pub async fn proofread(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ProofreadRequest>,
) -> Result<Json<ProofreadResponse>, AppError> {
    assist::run::<Proofread>(state.inference.as_ref(), req).await
}
