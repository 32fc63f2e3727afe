//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use timeclerk_util::TimeclerkError;
use tracing::{error, warn};

/// An engine error carried out to an HTTP response
#[derive(Debug)]
pub struct ApiError(pub TimeclerkError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<TimeclerkError> for ApiError {
    fn from(err: TimeclerkError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TimeclerkError::InvalidInput(_)
            | TimeclerkError::InvalidActivityConfig(_)
            | TimeclerkError::UnsupportedMode(_) => StatusCode::BAD_REQUEST,
            TimeclerkError::NotFound(_) => StatusCode::NOT_FOUND,
            TimeclerkError::Unauthorized => StatusCode::UNAUTHORIZED,
            TimeclerkError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, status = %status, "request rejected");
        }

        let body = Json(ErrorBody {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
