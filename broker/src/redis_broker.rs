//! Redis pub/sub implementation of [`Broker`].

use crate::{Broker, Error, MessageStream, EVENTS_CHANNEL};
use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::pin::Pin;

/// A [`Broker`] backed by a Redis server shared by all instances.
///
/// Publishing goes through a multiplexed connection, which is safe for
/// unconstrained concurrent callers. Each subscription opens its own
/// dedicated pub/sub connection, since a connection in subscriber mode cannot
/// carry other commands.
pub struct RedisBroker {
    client: redis::Client,
    publish_conn: MultiplexedConnection,
}

impl RedisBroker {
    /// Connect to the Redis server at `url` (e.g. `redis://localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url)?;
        let publish_conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            client,
            publish_conn,
        })
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, payload: String) -> Result<(), Error> {
        let mut conn = self.publish_conn.clone();
        conn.publish::<_, _, ()>(EVENTS_CHANNEL, payload).await?;
        Ok(())
    }

    async fn subscribe(&self) -> Result<Box<dyn MessageStream>, Error> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(EVENTS_CHANNEL).await?;
        Ok(Box::new(RedisMessages {
            messages: Box::pin(pubsub.into_on_message()),
        }))
    }
}

struct RedisMessages {
    messages: Pin<Box<dyn Stream<Item = redis::Msg> + Send>>,
}

#[async_trait]
impl MessageStream for RedisMessages {
    async fn next(&mut self) -> Result<String, Error> {
        let msg = self.messages.next().await.ok_or(Error::Disconnected)?;
        Ok(msg.get_payload()?)
    }
}
