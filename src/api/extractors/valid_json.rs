use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::api::dto::Validate;
use crate::error::AppError;

use super::body_rejection;

/// JSON body extractor that runs `Validate` after deserialization.
///
/// Content-Type is not checked. A body that is not JSON, lacks the field or has
/// it with the wrong type is rejected with `T::INVALID_MESSAGE`.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_rejection(e.status(), T::INVALID_MESSAGE))?;

        let value: T = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "request body rejected");
            AppError::bad_request(T::INVALID_MESSAGE)
        })?;

        value.validate().map_err(AppError::bad_request)?;

        Ok(Self(value))
    }
}
