use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::SumiError;

/// JSON extractor that rejects malformed bodies with the crate error type
/// (400 with a safe message) instead of axum's default rejection.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn login(Json(payload): Json<LoginRequest>) -> impl IntoResponse {
///     // payload is deserialized from the request body
/// }
/// ```
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = SumiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| SumiError::Validation(format!("Failed to read body: {}", e)))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| SumiError::Validation(format!("Invalid JSON: {}", e)))?;

        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        let bytes = serde_json::to_vec(&self.0).unwrap_or_default();
        (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response()
    }
}
