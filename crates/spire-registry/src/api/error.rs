//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::status::{Code, Status};

/// API error response body
///
/// Carries the status code and message so a client can rebuild the
/// original [`Status`] without loss.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: Code,
}

impl From<ErrorResponse> for Status {
    fn from(body: ErrorResponse) -> Self {
        Status::new(body.code, body.error)
    }
}

/// HTTP status used to carry a registry code
pub fn http_status(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::Cancelled => StatusCode::REQUEST_TIMEOUT,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::AlreadyExists => StatusCode::CONFLICT,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        let status = http_status(self.code);
        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(http_status(Code::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(http_status(Code::AlreadyExists), StatusCode::CONFLICT);
        assert_eq!(http_status(Code::Unavailable), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_error_body_round_trips_status() {
        let body = ErrorResponse {
            error: "entry 'x' not found".into(),
            code: Code::NotFound,
        };
        let status: Status = body.into();
        assert_eq!(status, Status::not_found("entry 'x' not found"));
    }
}
