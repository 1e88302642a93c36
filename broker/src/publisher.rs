//! Publish-side entry point for the event system.

use crate::{Broker, Error};
use events::Envelope;
use log::*;
use std::sync::Arc;

/// Serializes envelopes and sends them to the shared events topic.
///
/// Fire-and-forget: `Ok` means the broker accepted the message, nothing
/// more. There is no internal retry; a caller that cannot afford to lose a
/// publish owns its own retry policy.
#[derive(Clone)]
pub struct Publisher {
    broker: Arc<dyn Broker>,
}

impl Publisher {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self { broker }
    }

    pub async fn publish(&self, envelope: &Envelope) -> Result<(), Error> {
        let payload = serde_json::to_string(envelope)?;
        trace!("Publishing event for user {}", envelope.user_id);
        self.broker.publish(payload).await
    }
}
