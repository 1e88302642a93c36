//! The bridge loop: shared broker topic → local hub.

use crate::Broker;
use events::Envelope;
use hub::Hub;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Republishes everything received from the shared broker topic into the
/// local hub, for the lifetime of the process.
///
/// Every instance receives every envelope; ones with no local subscriber are
/// dropped by the hub. A broken subscription is reopened with exponential
/// backoff; messages published during the gap are lost, which is within the
/// system's best-effort delivery contract.
pub struct Bridge {
    broker: Arc<dyn Broker>,
    hub: Hub,
}

impl Bridge {
    pub fn new(broker: Arc<dyn Broker>, hub: Hub) -> Self {
        Self { broker, hub }
    }

    /// Run the bridge on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match self.broker.subscribe().await {
                Ok(mut messages) => {
                    info!("Subscribed to the events topic");
                    backoff = INITIAL_BACKOFF;
                    self.pump(messages.as_mut()).await;
                }
                Err(err) => {
                    warn!("Failed to subscribe to the events topic: {err}");
                }
            }
            warn!("Resubscribing to the events topic in {backoff:?}");
            time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// Forward messages from one live subscription until it breaks.
    async fn pump(&self, messages: &mut dyn crate::MessageStream) {
        loop {
            match messages.next().await {
                Ok(payload) => match serde_json::from_str::<Envelope>(&payload) {
                    Ok(envelope) => self.hub.deliver(envelope),
                    // A malformed message from any instance must not take
                    // down the loop on every other instance.
                    Err(err) => warn!("Dropping undecodable broker message: {err}"),
                },
                Err(err) => {
                    warn!("Events subscription lost: {err}");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InProcessBroker;
    use crate::Publisher;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Wait until `count` bridge subscriptions are live on the broker, so a
    /// test publish cannot race the bridges' startup.
    async fn wait_for_subscribers(broker: &InProcessBroker, count: usize) {
        timeout(Duration::from_secs(1), async {
            while broker.subscriber_count() < count {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("bridges never subscribed");
    }

    async fn recv(subscription: &mut hub::Subscription) -> Envelope {
        timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("timed out waiting for an envelope")
            .expect("hub task ended unexpectedly")
    }

    #[tokio::test]
    async fn publish_on_one_instance_reaches_a_subscriber_on_another() {
        let broker = Arc::new(InProcessBroker::new());

        // Two hubs with a bridge each stand in for two server instances.
        let hub_a = Hub::spawn();
        let hub_b = Hub::spawn();
        Bridge::new(broker.clone(), hub_a.clone()).spawn();
        Bridge::new(broker.clone(), hub_b.clone()).spawn();
        wait_for_subscribers(&broker, 2).await;

        let mut subscription = hub_a.subscribe(7);

        // "Instance B" publishes; instance A's subscriber sees it.
        let publisher = Publisher::new(broker);
        let envelope = Envelope::new(7, "message", "{\"id\":42}");
        publisher.publish(&envelope).await.unwrap();

        assert_eq!(recv(&mut subscription).await, envelope);
    }

    #[tokio::test]
    async fn every_instance_with_a_matching_subscriber_delivers() {
        let broker = Arc::new(InProcessBroker::new());
        let hub_a = Hub::spawn();
        let hub_b = Hub::spawn();
        Bridge::new(broker.clone(), hub_a.clone()).spawn();
        Bridge::new(broker.clone(), hub_b.clone()).spawn();
        wait_for_subscribers(&broker, 2).await;

        let mut on_a = hub_a.subscribe(3);
        let mut on_b = hub_b.subscribe(3);

        let envelope = Envelope::new(3, "message", "everywhere");
        Publisher::new(broker).publish(&envelope).await.unwrap();

        assert_eq!(recv(&mut on_a).await, envelope);
        assert_eq!(recv(&mut on_b).await, envelope);
    }

    #[tokio::test]
    async fn malformed_broker_message_does_not_stop_the_loop() {
        let broker = Arc::new(InProcessBroker::new());
        let hub = Hub::spawn();
        Bridge::new(broker.clone(), hub.clone()).spawn();
        wait_for_subscribers(&broker, 1).await;

        let mut subscription = hub.subscribe(7);

        broker.publish("not json at all".to_string()).await.unwrap();
        broker
            .publish(r#"{"ID":"seven","Event":{}}"#.to_string())
            .await
            .unwrap();

        let envelope = Envelope::new(7, "message", "survived");
        Publisher::new(broker).publish(&envelope).await.unwrap();

        assert_eq!(recv(&mut subscription).await, envelope);
    }
}
