/*
 * Responsibility
 * - compose / proofread / transcribe 共通の流れ
 *   validate (extractor 済み) → provider 呼び出し → 結果 or 失敗を変換
 * - 各 handler は AssistTask を実装して prompt / 出力形だけを決める
 */
use axum::Json;
use serde::Serialize;

use crate::error::AppError;
use crate::services::inference::{ChatRequest, InferenceClient, TranscriptionRequest};

/// Which provider operation a task uses, with its fixed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    Chat(ChatRequest),
    Transcription(TranscriptionRequest),
}

pub trait AssistTask {
    type Input: Send;
    type Output: Serialize;

    /// Task label for logs.
    const NAME: &'static str;
    /// 500 body on provider failure. Provider detail is only logged.
    const FAILURE_MESSAGE: &'static str;

    fn provider_call(input: &Self::Input) -> ProviderCall;

    fn respond(input: Self::Input, content: String) -> Self::Output;
}

pub async fn run<T: AssistTask>(
    inference: &dyn InferenceClient,
    input: T::Input,
) -> Result<Json<T::Output>, AppError> {
    let result = match T::provider_call(&input) {
        ProviderCall::Chat(request) => inference.chat_completion(request).await,
        ProviderCall::Transcription(request) => inference.transcribe(request).await.map(Some),
    };

    match result {
        Ok(Some(content)) => Ok(Json(T::respond(input, content))),
        Ok(None) => {
            tracing::error!(
                task = T::NAME,
                provider = inference.provider_name(),
                "provider returned no content"
            );
            Err(AppError::upstream(T::FAILURE_MESSAGE))
        }
        Err(err) => {
            tracing::error!(
                task = T::NAME,
                provider = inference.provider_name(),
                error = %err,
                "provider call failed"
            );
            Err(AppError::upstream(T::FAILURE_MESSAGE))
        }
    }
}
