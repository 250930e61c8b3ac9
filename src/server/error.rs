/// HTTP error responses
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::api::ErrorMessage;

/// Every failure the server reports, with its status and wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    NotFound,
    MethodNotAllowed,
    BadRequest,
    InvalidLicense,
    InvalidGenerateRequest,
    InvalidApiKey,
    MissingApiKey,
    Internal,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidLicense => "INVALID_LICENSE",
            Self::InvalidGenerateRequest => "INVALID_GENERATE_REQUEST",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::MissingApiKey => "MISSING_API_KEY_HEADER",
            Self::Internal => "UNHANDLED_REJECTION",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorMessage {
            code: status.as_u16(),
            message: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
