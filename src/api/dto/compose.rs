/*
 * Responsibility
 * - POST /api/compose の request/response DTO
 */
use serde::{Deserialize, Serialize};

use super::Validate;

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub description: String,
}

impl Validate for ComposeRequest {
    const INVALID_MESSAGE: &'static str = "Description is required and must be a string";

    fn validate(&self) -> Result<(), &'static str> {
        if self.description.is_empty() {
            return Err(Self::INVALID_MESSAGE);
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub description: String,
    pub composed_message: String,
}
