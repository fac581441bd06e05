use lambda_http::{http::StatusCode, Body, Response};
use thiserror::Error;

use crate::response::envelope;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Every way a request can fail once it reaches the dispatcher.
///
/// The first three variants are caller mistakes and surface as 400 with their
/// message. The last two are server-side: the caller only ever sees a fixed
/// message and a correlation id, the cause goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}: {cause}")]
    Collaborator { message: &'static str, cause: String },
    #[error("internal failure: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn collaborator(message: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            message,
            cause: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NotFound(_) | Self::Unauthorized(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Collaborator { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error envelope. Server-side causes are logged against the
    /// correlation id and never copied into the body.
    pub fn into_response(
        self,
        correlation_id: &str,
    ) -> Result<Response<Body>, lambda_http::http::Error> {
        let status = self.status();
        let body = match self {
            Self::Validation(message) | Self::NotFound(message) | Self::Unauthorized(message) => {
                tracing::warn!("Rejected request ({}): {}", status.as_u16(), message);
                serde_json::json!({ "error": message })
            }
            Self::Collaborator { message, cause } => {
                tracing::error!(correlation_id, "{}: {}", message, cause);
                serde_json::json!({ "error": message, "correlationId": correlation_id })
            }
            Self::Internal(cause) => {
                tracing::error!(correlation_id, "Unhandled failure: {}", cause);
                serde_json::json!({ "error": INTERNAL_MESSAGE, "correlationId": correlation_id })
            }
        };
        envelope(status, body.to_string())
    }
}

impl From<lambda_http::http::Error> for ApiError {
    fn from(e: lambda_http::http::Error) -> Self {
        Self::Internal(format!("response build failed: {}", e))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {}", e))
    }
}
