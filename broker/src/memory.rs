//! Loopback [`Broker`] for single-instance deployments and tests.

use crate::{Broker, Error, MessageStream};
use async_trait::async_trait;
use log::*;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const CHANNEL_CAPACITY: usize = 256;

/// An in-process [`Broker`] built on a broadcast channel.
///
/// Gives a single instance the same publish → bridge → hub path as the
/// Redis-backed deployment, just without crossing a process boundary. Also
/// the broker of choice in tests, where several bridges subscribed to one
/// `InProcessBroker` stand in for a horizontally scaled deployment.
pub struct InProcessBroker {
    sender: broadcast::Sender<String>,
}

impl InProcessBroker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InProcessBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broker for InProcessBroker {
    async fn publish(&self, payload: String) -> Result<(), Error> {
        // No subscribers yet is not a failure; pub/sub delivery is
        // best-effort by contract.
        let _ = self.sender.send(payload);
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn MessageStream>, Error> {
        Ok(Box::new(InProcessMessages {
            receiver: self.sender.subscribe(),
        }))
    }
}

struct InProcessMessages {
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl MessageStream for InProcessMessages {
    async fn next(&mut self) -> Result<String, Error> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Ok(payload),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("In-process subscription lagged; skipped {skipped} messages");
                }
                Err(RecvError::Closed) => return Err(Error::Disconnected),
            }
        }
    }
}
