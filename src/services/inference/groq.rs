use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::services::inference::client::{
    ChatRequest, InferenceClient, InferenceError, InferenceResult, TranscriptionRequest,
};

/// Groq (OpenAI-compatible) inference client.
///
/// This is intentionally small: only the two operations the assist handlers
/// need. (`/chat/completions`, `/audio/transcriptions`)
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    transcription_model: String,
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("transcription_model", &self.transcription_model)
            .finish_non_exhaustive()
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: [WireMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GroqClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        chat_model: &str,
        transcription_model: &str,
        timeout: Duration,
    ) -> InferenceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            chat_model: chat_model.to_string(),
            transcription_model: transcription_model.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the body and turn non-2xx statuses into `InferenceError::Api`.
    async fn read_success_body(response: reqwest::Response) -> InferenceResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl InferenceClient for GroqClient {
    fn provider_name(&self) -> &'static str {
        "groq"
    }

    async fn chat_completion(&self, request: ChatRequest) -> InferenceResult<Option<String>> {
        let payload = ChatCompletionBody {
            model: &self.chat_model,
            messages: [
                WireMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                WireMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(self.url("/chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let body = Self::read_success_body(response).await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Decode(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty());

        Ok(content)
    }

    async fn transcribe(&self, request: TranscriptionRequest) -> InferenceResult<String> {
        let audio = request.audio;

        let mut part = Part::bytes(audio.data.to_vec()).file_name(audio.file_name);
        if let Some(content_type) = audio.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| InferenceError::Request(e.to_string()))?;
        }

        let form = Form::new()
            .part("file", part)
            .text("model", self.transcription_model.clone())
            .text("temperature", request.temperature.to_string())
            .text("response_format", request.response_format);

        let response = self
            .http
            .post(self.url("/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let body = Self::read_success_body(response).await?;
        let parsed: TranscriptionResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Decode(e.to_string()))?;

        Ok(parsed.text)
    }
}
