/*
 * Responsibility
 * - POST /api/proofread の request/response DTO
 */
use serde::{Deserialize, Serialize};

use super::Validate;

#[derive(Debug, Deserialize)]
pub struct ProofreadRequest {
    pub text: String,
}

impl Validate for ProofreadRequest {
    const INVALID_MESSAGE: &'static str = "Text is required and must be a string";

    fn validate(&self) -> Result<(), &'static str> {
        if self.text.is_empty() {
            return Err(Self::INVALID_MESSAGE);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadResponse {
    pub original_text: String,
    pub proofread_text: String,
}
