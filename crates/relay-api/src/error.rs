//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use relay_client::ClientError;
use thiserror::Error;
use tracing::{debug, error};

use crate::types::MessageResponse;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
///
/// Response bodies carry a fixed public message; details stay in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session is not ready to send.
    #[error("WhatsApp client not ready yet")]
    NotReady,

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Media resolution or delivery failed.
    #[error("send failed: {0}")]
    SendFailed(#[from] ClientError),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::SendFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::NotReady => "WhatsApp client not ready yet",
            ApiError::BadRequest(_) => "Missing phone or message",
            ApiError::SendFailed(_) => "Failed to send message",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::SendFailed(e) => error!(error = %e, "Error sending WhatsApp message"),
            ApiError::BadRequest(reason) => debug!(reason = %reason, "Rejected send request"),
            ApiError::NotReady => debug!("Rejected send request, client not ready"),
        }

        let status = self.status_code();
        let body = Json(MessageResponse::new(self.public_message()));
        (status, body).into_response()
    }
}
