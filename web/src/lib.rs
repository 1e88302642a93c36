//! HTTP layer for the real-time event delivery hub.
//!
//! Exposes three things: the long-lived SSE stream each authenticated client
//! holds open (`GET /events`), the publish endpoint that feeds the broker
//! (`POST /events/:user_id`), and a health check. Everything stateful lives
//! below this crate: the hub owns the connection registry and the broker
//! crate owns cross-instance fan-out; handlers here only adapt HTTP to those.

pub(crate) mod controller;
mod error;
pub(crate) mod extractors;
pub(crate) mod params;
pub mod router;
pub(crate) mod sse;

pub use error::{Error, Result};

pub(crate) use service::AppState;
