//! Event value types for the real-time delivery hub.
//!
//! This crate holds the immutable types that travel from a publisher, across
//! the shared broker topic, through the hub, and out to a streaming
//! connection. It has no dependencies on the other internal crates, which
//! keeps it usable from every layer without cycles.
//!
//! The JSON wire format is fixed by the rest of the system: an envelope is
//! `{"ID": <user id>, "Event": {"Type": "...", "Data": "..."}}`. Lowercase
//! field names are accepted on input for convenience of HTTP clients.

use serde::{Deserialize, Serialize};

/// A type alias for the identifier of the user an envelope targets.
pub type UserId = u64;

/// A single notification as seen by a client: a type name the client switches
/// on, and an opaque data payload (usually a JSON document, passed through
/// verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "Type", alias = "type")]
    pub kind: String,
    #[serde(rename = "Data", alias = "data")]
    pub data: String,
}

/// The unit of routable notification data: which user it is for, and the
/// event to show them. Built once by a publisher and never modified in
/// transit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "ID", alias = "id")]
    pub user_id: UserId,
    #[serde(rename = "Event", alias = "event")]
    pub event: Event,
}

impl Envelope {
    pub fn new(user_id: UserId, kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            user_id,
            event: Event {
                kind: kind.into(),
                data: data.into(),
            },
        }
    }
}
