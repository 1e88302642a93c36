use crate::subscriber::{Subscriber, SubscriberId, OUTBOUND_BUFFER};
use events::{Envelope, UserId};
use log::*;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Commands accepted by the hub task. Every registry operation goes through
/// this queue, which is the single serialization point for the registry.
enum Command {
    Register(Subscriber),
    Deregister { user_id: UserId, id: SubscriberId },
    Deliver(Envelope),
}

/// Handle to the hub task. Cloning is cheap; all clones talk to the same
/// registry.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
}

impl Hub {
    /// Start the hub task and return a handle to it. The task runs until the
    /// last `Hub` clone is dropped.
    pub fn spawn() -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        tokio::spawn(run(inbox));
        Self { commands }
    }

    /// Register a new streaming connection for `user_id`.
    ///
    /// The returned [`Subscription`] is the connection's end of the pipe;
    /// dropping it deregisters the connection, however the connection ended.
    pub fn subscribe(&self, user_id: UserId) -> Subscription {
        let (sender, events) = mpsc::channel(OUTBOUND_BUFFER);
        let id = SubscriberId::new();
        self.send(Command::Register(Subscriber {
            id,
            user_id,
            sender,
        }));
        debug!("Registering subscriber {id} for user {user_id}");
        Subscription {
            id,
            user_id,
            hub: self.clone(),
            events,
        }
    }

    /// Queue an envelope for delivery to every connection of its target user.
    ///
    /// Never fails and never blocks: with no connections for the user the
    /// envelope is silently dropped, and a connection that is not reading its
    /// outbound channel is skipped rather than waited on.
    pub fn deliver(&self, envelope: Envelope) {
        self.send(Command::Deliver(envelope));
    }

    fn send(&self, command: Command) {
        // Only fails once the hub task has exited, i.e. during shutdown.
        if self.commands.send(command).is_err() {
            warn!("Hub task is gone; dropping command");
        }
    }
}

/// The hub task: sole owner of the subscriber registry. Processes one command
/// at a time, so registration, deregistration, and delivery can never race
/// for a registry bucket.
async fn run(mut inbox: mpsc::UnboundedReceiver<Command>) {
    let mut registry: HashMap<UserId, Vec<Subscriber>> = HashMap::new();

    while let Some(command) = inbox.recv().await {
        match command {
            Command::Register(subscriber) => {
                registry
                    .entry(subscriber.user_id)
                    .or_default()
                    .push(subscriber);
            }
            Command::Deregister { user_id, id } => {
                if let Some(bucket) = registry.get_mut(&user_id) {
                    bucket.retain(|subscriber| subscriber.id != id);
                    if bucket.is_empty() {
                        registry.remove(&user_id);
                    }
                }
            }
            Command::Deliver(envelope) => {
                let Some(bucket) = registry.get(&envelope.user_id) else {
                    trace!("No subscribers for user {}; dropping event", envelope.user_id);
                    continue;
                };
                for subscriber in bucket {
                    match subscriber.sender.try_send(envelope.clone()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            warn!(
                                "Subscriber {} for user {} is not keeping up; dropping event",
                                subscriber.id, envelope.user_id
                            );
                        }
                        Err(TrySendError::Closed(_)) => {
                            // Connection already gone; its deregistration is
                            // queued behind this delivery.
                            debug!(
                                "Subscriber {} for user {} is closed; dropping event",
                                subscriber.id, envelope.user_id
                            );
                        }
                    }
                }
            }
        }
    }

    debug!("Hub task shutting down");
}

/// One connection's registration in the hub.
///
/// Holds the receiving end of the connection's outbound channel. Dropping the
/// subscription submits its deregistration to the hub before the drop
/// returns, so the registry never retains a connection past its handler.
pub struct Subscription {
    id: SubscriberId,
    user_id: UserId,
    hub: Hub,
    events: mpsc::Receiver<Envelope>,
}

impl Subscription {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Wait for the next envelope delivered to this connection. Returns
    /// `None` only if the hub task has shut down.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.events.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!(
            "Deregistering subscriber {} for user {}",
            self.id, self.user_id
        );
        self.hub.send(Command::Deregister {
            user_id: self.user_id,
            id: self.id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn recv(subscription: &mut Subscription) -> Envelope {
        timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("timed out waiting for an envelope")
            .expect("hub task ended unexpectedly")
    }

    #[tokio::test]
    async fn delivers_to_a_single_subscriber_exactly_once() {
        let hub = Hub::spawn();
        let mut subscription = hub.subscribe(7);

        let envelope = Envelope::new(7, "message", "hi");
        hub.deliver(envelope.clone());

        assert_eq!(recv(&mut subscription).await, envelope);
        assert!(subscription.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn delivery_without_subscribers_is_a_noop() {
        let hub = Hub::spawn();
        hub.deliver(Envelope::new(9, "message", "nobody home"));

        // The hub stays responsive afterwards and the dropped envelope never
        // reaches a subscriber registered later.
        let mut subscription = hub.subscribe(9);
        let envelope = Envelope::new(9, "message", "second");
        hub.deliver(envelope.clone());
        assert_eq!(recv(&mut subscription).await, envelope);
    }

    #[tokio::test]
    async fn fans_out_to_every_connection_of_the_user() {
        let hub = Hub::spawn();
        let mut first = hub.subscribe(7);
        let mut second = hub.subscribe(7);

        let envelope = Envelope::new(7, "message", "both");
        hub.deliver(envelope.clone());

        assert_eq!(recv(&mut first).await, envelope);
        assert_eq!(recv(&mut second).await, envelope);
    }

    #[tokio::test]
    async fn does_not_deliver_across_users() {
        let hub = Hub::spawn();
        let mut seven = hub.subscribe(7);
        let mut eight = hub.subscribe(8);

        hub.deliver(Envelope::new(8, "message", "for eight"));

        assert_eq!(
            recv(&mut eight).await,
            Envelope::new(8, "message", "for eight")
        );
        // A follow-up envelope for user 7 arrives first, proving the earlier
        // one was never queued for them.
        hub.deliver(Envelope::new(7, "message", "for seven"));
        assert_eq!(
            recv(&mut seven).await,
            Envelope::new(7, "message", "for seven")
        );
    }

    #[tokio::test]
    async fn preserves_per_user_delivery_order() {
        let hub = Hub::spawn();
        let mut subscription = hub.subscribe(7);

        for n in 0..5 {
            hub.deliver(Envelope::new(7, "message", n.to_string()));
        }
        for n in 0..5 {
            assert_eq!(recv(&mut subscription).await.event.data, n.to_string());
        }
    }

    #[tokio::test]
    async fn dropping_a_subscription_deregisters_it() {
        let hub = Hub::spawn();
        let first = hub.subscribe(7);
        let mut second = hub.subscribe(7);

        drop(first);

        let envelope = Envelope::new(7, "message", "still here");
        hub.deliver(envelope.clone());
        assert_eq!(recv(&mut second).await, envelope);

        // Dropping the last subscription prunes the bucket; delivering into
        // the empty registry is still a no-op.
        drop(second);
        hub.deliver(Envelope::new(7, "message", "into the void"));
        let mut third = hub.subscribe(7);
        let envelope = Envelope::new(7, "message", "fresh");
        hub.deliver(envelope.clone());
        assert_eq!(recv(&mut third).await, envelope);
    }

    #[tokio::test]
    async fn slow_subscriber_does_not_block_delivery_to_others() {
        let hub = Hub::spawn();
        let mut stalled = hub.subscribe(1);
        let mut healthy = hub.subscribe(2);

        // Overflow the stalled subscriber's outbound buffer without reading.
        for n in 0..(OUTBOUND_BUFFER + 5) {
            hub.deliver(Envelope::new(1, "message", n.to_string()));
        }

        // The hub must still hand envelopes to other users promptly. This
        // also acts as a barrier: once it arrives, all commands above have
        // been processed.
        let envelope = Envelope::new(2, "message", "unblocked");
        hub.deliver(envelope.clone());
        assert_eq!(recv(&mut healthy).await, envelope);

        // The stalled subscriber kept the first OUTBOUND_BUFFER envelopes and
        // lost the overflow instead of wedging the hub.
        let mut received = 0;
        while stalled.events.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, OUTBOUND_BUFFER);
    }
}
