//! Session validation: maps a request credential to a user identity.
//!
//! The rest of the system only sees the [`SessionValidator`] trait. The
//! production implementation looks tokens up in the same Redis instance the
//! surrounding API writes sessions into; the in-memory implementation backs
//! single-instance development runs and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use events::UserId;
use log::*;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

/// Key prefix the surrounding API uses when it stores a session.
pub const SESSION_KEY_PREFIX: &str = "session-";

#[derive(Debug)]
pub enum AuthError {
    /// No session exists for the presented credential.
    Unauthorized,
    /// The session backend failed; distinct from "no session" so the web
    /// layer can answer 500 instead of 401.
    Backend(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized => write!(f, "unauthorized"),
            AuthError::Backend(msg) => write!(f, "session backend error: {msg}"),
        }
    }
}

impl StdError for AuthError {}

#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Resolve a session token to the user it belongs to.
    async fn validate(&self, token: &str) -> Result<UserId, AuthError>;
}

/// Session store backed by the shared Redis instance.
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    expiry: Duration,
}

impl RedisSessionStore {
    pub async fn connect(url: &str, expiry: Duration) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, expiry })
    }
}

#[async_trait]
impl SessionValidator for RedisSessionStore {
    async fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        let key = format!("{SESSION_KEY_PREFIX}{token}");
        let mut conn = self.conn.clone();

        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|err| AuthError::Backend(err.to_string()))?;
        let value = value.ok_or(AuthError::Unauthorized)?;
        let user_id = value
            .trim()
            .parse::<UserId>()
            .map_err(|_| AuthError::Backend(format!("session value is not a user id: {value}")))?;

        // Sliding expiry: every validated request keeps the session alive.
        // A failed refresh is logged but does not block authentication.
        if let Err(err) = conn
            .expire::<_, bool>(&key, self.expiry.as_secs() as i64)
            .await
        {
            warn!("Failed to refresh session expiry: {err}");
        }

        Ok(user_id)
    }
}

/// In-memory session store for development and tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, UserId>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, user_id: UserId) {
        self.sessions.insert(token.into(), user_id);
    }
}

#[async_trait]
impl SessionValidator for MemorySessionStore {
    async fn validate(&self, token: &str) -> Result<UserId, AuthError> {
        self.sessions
            .get(token)
            .map(|entry| *entry.value())
            .ok_or(AuthError::Unauthorized)
    }
}
