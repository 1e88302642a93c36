//! Error type for broker publish and subscribe paths.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The broker rejected or never received an operation.
    Broker(redis::RedisError),
    /// An envelope could not be serialized for the wire.
    Encoding(serde_json::Error),
    /// The subscription stream ended; the subscriber must resubscribe.
    Disconnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Broker(err) => write!(f, "broker error: {err}"),
            Error::Encoding(err) => write!(f, "envelope encoding error: {err}"),
            Error::Disconnected => write!(f, "broker subscription disconnected"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Broker(err) => Some(err),
            Error::Encoding(err) => Some(err),
            Error::Disconnected => None,
        }
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Broker(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encoding(err)
    }
}
