use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linkhop_core::ShortenerError;
use linkhop_redirector::RedirectorError;
use thiserror::Error;
use tracing::{debug, error};

pub type Result<T> = std::result::Result<T, AppError>;

pub const URL_NOT_FOUND: &str = "404: URL not found";
pub const INVALID_CONTENT_TYPE: &str = "Invalid Content-Type. Expected application/json";
pub const INVALID_BODY: &str = "Invalid JSON body";
pub const INVALID_URL: &str = "Invalid URL";
pub const SERVER_ERROR: &str = "Server error";

/// Every failure a handler can report.
///
/// Responses carry a short fixed body. The error itself is only logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("request content type is not application/json")]
    InvalidContentType,
    #[error("malformed request body: {0}")]
    InvalidBody(String),
    #[error("short url not found")]
    UrlNotFound,
    #[error("redirect target is not a valid header value: {0}")]
    InvalidLocation(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Redirector(#[from] RedirectorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::InvalidContentType => (StatusCode::BAD_REQUEST, INVALID_CONTENT_TYPE),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, INVALID_BODY),
            AppError::UrlNotFound => (StatusCode::NOT_FOUND, URL_NOT_FOUND),
            AppError::Shortener(ShortenerError::InvalidUrl(_)) => {
                (StatusCode::BAD_REQUEST, INVALID_URL)
            }
            AppError::InvalidLocation(_)
            | AppError::Shortener(ShortenerError::ExhaustedRetries(_))
            | AppError::Shortener(ShortenerError::Storage(_))
            | AppError::Redirector(_) => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR),
        };

        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "rejected request");
        }

        (status, body).into_response()
    }
}
