use events::{Envelope, UserId};
use std::fmt;
use tokio::sync::mpsc::Sender;

/// How many undelivered envelopes a single connection may buffer before the
/// hub starts dropping events for it. A reader that falls this far behind is
/// treated as unreachable rather than allowed to hold memory open.
pub(crate) const OUTBOUND_BUFFER: usize = 32;

/// Unique identifier for one registered connection (server-generated).
///
/// Deregistration matches on this id, not on the user id, so two connections
/// from the same user never interfere with each other's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One open streaming connection as the hub sees it: who it belongs to and
/// the outbound channel its adapter is reading from. Lives inside the hub's
/// registry from registration until deregistration.
#[derive(Debug, Clone)]
pub(crate) struct Subscriber {
    pub(crate) id: SubscriberId,
    pub(crate) user_id: UserId,
    pub(crate) sender: Sender<Envelope>,
}
