/*
 * Responsibility
 * - POST /api/transcribe (multipart/form-data, field: file)
 * - 音声 → テキスト。結果はそのまま返す (trim しない、空文字も 200)
 */
use axum::{Json, extract::State};

use crate::{
    api::{
        dto::transcribe::TranscribeResponse,
        extractors::AudioFile,
        handlers::assist::{self, AssistTask, ProviderCall},
    },
    error::AppError,
    services::inference::{AudioUpload, TranscriptionRequest},
    state::AppState,
};

pub struct Transcribe;

impl AssistTask for Transcribe {
    type Input = AudioUpload;
    type Output = TranscribeResponse;

    const NAME: &'static str = "transcribe";
    const FAILURE_MESSAGE: &'static str = "Failed to transcribe audio";

    fn provider_call(input: &AudioUpload) -> ProviderCall {
        ProviderCall::Transcription(TranscriptionRequest {
            audio: input.clone(),
            temperature: 0.0,
            response_format: "verbose_json",
        })
    }

    fn respond(_input: AudioUpload, content: String) -> TranscribeResponse {
        TranscribeResponse { text: content }
    }
}

pub async fn transcribe(
    State(state): State<AppState>,
    AudioFile(audio): AudioFile,
) -> Result<Json<TranscribeResponse>, AppError> {
    tracing::debug!(
        file_name = %audio.file_name,
        bytes = audio.data.len(),
        "transcription requested"
    );
    assist::run::<Transcribe>(state.inference.as_ref(), audio).await
}
