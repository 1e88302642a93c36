//! Broker bridge: cross-instance fan-out for the event hub.
//!
//! Every server instance publishes envelopes to one shared broker topic and
//! runs a [`Bridge`] that republishes everything received from that topic
//! into its local hub. A user connected to instance A therefore receives
//! events published on instance B without any shared connection state; each
//! hub only ever knows about its own connections.
//!
//! [`Broker`] is the seam: production uses [`redis_broker::RedisBroker`]
//! (Redis pub/sub), while single-instance deployments and tests use
//! [`memory::InProcessBroker`], a loopback with identical semantics.

pub mod bridge;
pub mod error;
pub mod memory;
pub mod publisher;
pub mod redis_broker;

pub use bridge::Bridge;
pub use error::Error;
pub use publisher::Publisher;

use async_trait::async_trait;

/// The broker topic shared by all instances, used both for publish and
/// subscribe.
pub const EVENTS_CHANNEL: &str = "events";

/// A publish/subscribe message broker, reduced to the two operations the
/// event system needs.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Send a raw payload to the shared events topic. Returns once the
    /// broker has accepted the message; end-to-end delivery is best-effort.
    async fn publish(&self, payload: String) -> Result<(), Error>;

    /// Open a fresh subscription to the shared events topic.
    async fn subscribe(&self) -> Result<Box<dyn MessageStream>, Error>;
}

/// One live subscription's stream of raw messages.
#[async_trait]
pub trait MessageStream: Send {
    /// Wait for the next message. An error means the subscription is broken
    /// and the caller should subscribe again.
    async fn next(&mut self) -> Result<String, Error>;
}
