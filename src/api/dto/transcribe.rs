use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}
