//! HTTP-facing error type for the query endpoint.
//!
//! [`RelayError`] renders as a failure [`ResultEnvelope`] whose `code` field
//! matches the HTTP status it is sent with.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::output_types::ResultEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Body missing, unparsable, or not a JSON object (400).
    #[error("No JSON data in request")]
    NoJsonData,

    /// `query` missing, empty, or not a string (400).
    #[error("No query provided in request")]
    NoQuery,

    /// The body could not be buffered, e.g. it exceeds the size limit.
    #[error("Request body could not be read: {reason}")]
    UnreadableBody { status: StatusCode, reason: String },

    /// Anything that escaped dispatch (500).
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoJsonData | RelayError::NoQuery => StatusCode::BAD_REQUEST,
            RelayError::UnreadableBody { status, .. } => *status,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BytesRejection> for RelayError {
    fn from(rejection: BytesRejection) -> Self {
        RelayError::UnreadableBody {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ResultEnvelope::failure(self.to_string()).with_code(status.as_u16());
        (status, Json(body)).into_response()
    }
}
