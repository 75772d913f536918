//! Unified relay error type.
//!
//! The chat handler returns `Result<_, RelayError>`; the
//! [`axum::response::IntoResponse`] impl maps each variant onto the wire
//! contract, which carries error notices in the same `{"reply": ...}` shape
//! as success bodies so the client can render them as chat text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::relay::provider::ProviderError;

#[derive(Debug, Error)]
pub enum RelayError {
    /// The message was missing or blank after trimming.
    #[error("no message provided")]
    InvalidRequest,

    /// The provider call failed. Logged server-side; the detail string is
    /// embedded in the reply notice.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, reply) = match &self {
            RelayError::InvalidRequest => {
                (StatusCode::BAD_REQUEST, "No message provided.".to_string())
            }
            RelayError::Provider(e) => {
                error!(error = %e, "Gemini API error!!");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Error connecting to Gemini API!!: {e}"),
                )
            }
        };
        (status, Json(json!({ "reply": reply }))).into_response()
    }
}
