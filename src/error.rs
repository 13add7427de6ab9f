/// Error handling for the banner server
///
/// This module provides a unified error type that maps to HTTP responses.
/// Handlers return `Result<T, ApiError>` which converts automatically.
///
/// Internal failure details (paths, I/O errors) are logged server-side and
/// never included in the response body; the client only ever sees the
/// generic `Server error` text.
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Internal server error (500)
    ///
    /// The reason is logged, not sent to the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// Too many requests (429)
    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited {
        /// Requests allowed per window
        limit: u32,
        /// Seconds until the client's window resets
        retry_after: u64,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Internal(reason) => {
                tracing::error!(%reason, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }
            ApiError::RateLimited { limit, retry_after } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many requests, please try again later.",
                )
                    .into_response();

                let headers = response.headers_mut();
                headers.insert("Retry-After", HeaderValue::from(retry_after));
                headers.insert("RateLimit-Limit", HeaderValue::from(limit));
                headers.insert("RateLimit-Remaining", HeaderValue::from_static("0"));
                headers.insert("RateLimit-Reset", HeaderValue::from(retry_after));
                response
            }
        }
    }
}
