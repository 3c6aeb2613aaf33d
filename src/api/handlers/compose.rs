/*
 * Responsibility
 * - POST /api/compose
 * - description から、前向きなトーンのビジネスメッセージを生成する
 */
use axum::{Json, extract::State};

use crate::{
    api::{
        dto::compose::{ComposeRequest, ComposeResponse},
        extractors::ValidJson,
        handlers::assist::{self, AssistTask, ProviderCall},
    },
    error::AppError,
    services::inference::ChatRequest,
    state::AppState,
};

const SYSTEM_PROMPT: &str = "You are a professional message composer. Based on the user's description, write a clear, concise, and professional message with a positive tone. The message should be well-structured, appropriate for business communication, and maintain a good vibe. Focus on clarity and professionalism while being approachable. Return only the composed message without explanations or additional formatting.";

pub struct Compose;

impl AssistTask for Compose {
    type Input = ComposeRequest;
    type Output = ComposeResponse;

    const NAME: &'static str = "compose";
    const FAILURE_MESSAGE: &'static str = "Failed to compose message";

    fn provider_call(input: &ComposeRequest) -> ProviderCall {
        ProviderCall::Chat(ChatRequest {
            system_prompt: SYSTEM_PROMPT,
            user_message: format!(
                "Please compose a professional message based on this description: {}",
                input.description
            ),
            temperature: 0.7,
            max_tokens: 8192,
        })
    }

    fn respond(input: ComposeRequest, content: String) -> ComposeResponse {
        ComposeResponse {
            description: input.description,
            composed_message: content.trim().to_string(),
        }
    }
}

pub async fn compose(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    assist::run::<Compose>(state.inference.as_ref(), req).await
}
