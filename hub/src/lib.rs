//! The event hub: process-local fan-out of envelopes to streaming connections.
//!
//! # Architecture
//!
//! - **Single-owner registry**: the mapping from user id to open connections
//!   is owned by exactly one task. Registration, deregistration, and delivery
//!   are commands on one queue, so no two registry operations ever overlap and
//!   the registry needs no locks.
//! - **Cheap handles**: [`Hub`] is a clonable handle around the command queue
//!   and can be shared freely across request handlers and background tasks.
//! - **Non-blocking delivery**: each subscriber owns a bounded outbound
//!   channel that the hub fills with `try_send`. A connection that stopped
//!   reading (or already disconnected) can never stall delivery to anyone
//!   else.
//! - **Scoped deregistration**: [`Subscription`] deregisters itself when
//!   dropped, so a connection handler that returns, errors, or panics always
//!   leaves the registry clean.
//!
//! # Modules
//!
//! - `hub`: the actor loop, its command queue, and the `Hub`/`Subscription`
//!   handles
//! - `subscriber`: per-connection registration state and ids

pub mod hub;
pub mod subscriber;

pub use hub::{Hub, Subscription};
pub use subscriber::SubscriberId;
