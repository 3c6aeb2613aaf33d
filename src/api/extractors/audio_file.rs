use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;
use crate::services::inference::AudioUpload;

use super::body_rejection;

const NO_AUDIO_FILE: &str = "No audio file provided";

// Used when the part carries no filename; the provider infers the format from the extension.
const DEFAULT_FILE_NAME: &str = "audio.wav";

/// The `file` part of a `multipart/form-data` body.
///
/// Other parts are skipped. No `file` part, a `file` part that is a plain text
/// field, or a non-multipart body is a 400.
pub struct AudioFile(pub AudioUpload);

impl<S> FromRequest<S> for AudioFile
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| body_rejection(e.status(), NO_AUDIO_FILE))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| body_rejection(e.status(), NO_AUDIO_FILE))?
        {
            if field.name() != Some("file") {
                continue;
            }

            // A plain form field (no filename, no content type) is not an upload.
            if field.file_name().is_none() && field.content_type().is_none() {
                return Err(AppError::bad_request(NO_AUDIO_FILE));
            }

            let file_name = field
                .file_name()
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_FILE_NAME)
                .to_string();
            let content_type = field.content_type().map(str::to_string);

            let data = field
                .bytes()
                .await
                .map_err(|e| body_rejection(e.status(), NO_AUDIO_FILE))?;

            return Ok(Self(AudioUpload {
                file_name,
                content_type,
                data,
            }));
        }

        Err(AppError::bad_request(NO_AUDIO_FILE))
    }
}
