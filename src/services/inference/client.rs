//! Inference client interface used by the assist handlers.
use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

/// Result type for provider operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Provider-layer errors (transport/status/decoding).
///
/// Note:
/// - Kept independent from `AppError`. Handlers log the detail and return a
///   generic message so provider internals never reach the client.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode provider response: {0}")]
    Decode(String),
}

/// One chat completion call: a fixed system prompt plus a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system_prompt: &'static str,
    pub user_message: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Uploaded audio forwarded to speech-to-text.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub audio: AudioUpload,
    pub temperature: f32,
    pub response_format: &'static str,
}

/// Hosted model provider (chat completion + audio transcription).
///
/// Implementations must be cheap to share (`Arc<dyn InferenceClient>` in state).
#[async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    // Provider name (for logging).
    fn provider_name(&self) -> &'static str;

    // Returns the first choice's message content.
    //
    // Returns:
    // - `Ok(Some(text))` when the provider produced non-empty content
    // - `Ok(None)` when the response carried no usable content
    async fn chat_completion(&self, request: ChatRequest) -> InferenceResult<Option<String>>;

    // Returns the transcribed text (possibly empty).
    async fn transcribe(&self, request: TranscriptionRequest) -> InferenceResult<String>;
}
