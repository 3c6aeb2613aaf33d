/*
 * Responsibility
 * - handler が受け取る入力の extractor (形式チェック込み)
 * - 失敗時は AppError (400/413) をそのまま返す
 */
mod audio_file;
mod valid_json;

pub use audio_file::AudioFile;
pub use valid_json::ValidJson;

use axum::http::StatusCode;

use crate::error::AppError;

fn body_rejection(status: StatusCode, message: &'static str) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::bad_request(message)
    }
}
