use broker::memory::InProcessBroker;
use broker::redis_broker::RedisBroker;
use broker::{Broker, Publisher};
use config::Config;
use hub::Hub;
use log::*;
use session::{MemorySessionStore, RedisSessionStore, SessionValidator};
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod logging;
pub mod session;

/// Connect the cross-instance events broker, or fall back to the in-process
/// loopback when no Redis URL is configured (single-instance deployment).
pub async fn init_broker(config: &Config) -> Result<Arc<dyn Broker>, broker::Error> {
    match config.redis_url() {
        Some(url) => {
            info!("Connecting to the events broker");
            Ok(Arc::new(RedisBroker::connect(url).await?))
        }
        None => {
            warn!("REDIS_URL is not set; events will not cross instances (in-process broker)");
            Ok(Arc::new(InProcessBroker::new()))
        }
    }
}

/// Connect the session store matching the broker deployment mode.
pub async fn init_session_store(
    config: &Config,
) -> Result<Arc<dyn SessionValidator>, redis::RedisError> {
    let expiry = Duration::from_secs(config.session_expiry_seconds);
    match config.redis_url() {
        Some(url) => Ok(Arc::new(RedisSessionStore::connect(url, expiry).await?)),
        None => {
            warn!("REDIS_URL is not set; using an in-memory session store (development only)");
            Ok(Arc::new(MemorySessionStore::new()))
        }
    }
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
    pub publisher: Publisher,
    pub sessions: Arc<dyn SessionValidator>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        hub: Hub,
        publisher: Publisher,
        sessions: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            hub,
            publisher,
            sessions,
            config,
        }
    }
}
