//! Persisted login session.
//!
//! The bearer token every authenticated request needs lives in a
//! [`SessionStore`], a small async key-value store. It is set at login,
//! read by every authenticated fetch and cleared at logout. [`Session`] is the
//! explicit handle passed to fetchers instead of ambient global state.
//!
//! # Example
//!
//! ```ignore
//! use datagrid_lib::session::{AccessToken, Session, SqliteSessionStore};
//!
//! let session = Session::new(SqliteSessionStore::open("session.db").await?);
//! session.login(AccessToken::new("eyJhbGciOi...")).await?;
//!
//! assert!(session.token().await?.is_some());
//! session.logout().await?;
//! ```

mod memory;
mod sqlite;
mod token;

pub use memory::*;
pub use sqlite::*;
pub use token::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SessionError;

/// Key under which the encoded [`AccessToken`] is stored.
pub const TOKEN_KEY: &str = "auth_token";

/// Trait for session key-value stores.
///
/// Values are opaque bytes; [`Session`] handles encoding.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Retrieves the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), SessionError>;

    /// Removes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// Handle to the current login session.
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Creates a session backed by the given store.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Creates a session that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(InMemorySessionStore::new())
    }

    /// Stores the token obtained at login.
    pub async fn login(&self, token: AccessToken) -> Result<(), SessionError> {
        let encoded = bincode::serialize(&token)?;
        self.store.set(TOKEN_KEY, encoded).await?;
        log::debug!("session token stored");
        Ok(())
    }

    /// Forgets the stored token.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY).await?;
        log::debug!("session token cleared");
        Ok(())
    }

    /// Returns the stored token if there is a usable one.
    ///
    /// Missing, blank and expired tokens all yield `None`.
    pub async fn token(&self) -> Result<Option<AccessToken>, SessionError> {
        let Some(bytes) = self.store.get(TOKEN_KEY).await? else {
            return Ok(None);
        };
        let token: AccessToken = bincode::deserialize(&bytes)?;

        if token.access_token.trim().is_empty() {
            return Ok(None);
        }
        if token.is_expired() {
            log::debug!("session token expired at {:?}", token.expires_at);
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Returns `true` if a usable token is stored.
    pub async fn is_logged_in(&self) -> Result<bool, SessionError> {
        Ok(self.token().await?.is_some())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}
