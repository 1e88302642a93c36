//! SSE HTTP handler for the web layer.
//!
//! This module contains only the Axum handler binding one long-lived stream
//! to one hub subscription. The registry and delivery machinery live in the
//! `hub` crate.

pub mod handler;
