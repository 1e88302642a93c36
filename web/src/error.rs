use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use service::session::AuthError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// No valid session accompanied the request.
    Unauthorized,
    /// The x-version header is missing or names an unsupported API version.
    InvalidApiVersion,
    /// The events broker refused a publish.
    Broker(broker::Error),
    /// Infrastructure failed in a way unrelated to the caller's input.
    Internal(String),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => Error::Unauthorized,
            AuthError::Backend(msg) => Error::Internal(msg),
        }
    }
}

impl From<broker::Error> for Error {
    fn from(err: broker::Error) -> Self {
        Error::Broker(err)
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            Error::InvalidApiVersion => {
                (StatusCode::BAD_REQUEST, "Invalid API version").into_response()
            }
            Error::Broker(_) => (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response(),
            Error::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}
