//! In-memory session store using DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::SessionStore;
use crate::error::SessionError;

/// A session store backed by a concurrent hash map.
///
/// Nothing survives the process; useful for tests and one-shot commands.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    store: DashMap<String, Vec<u8>>,
}

impl InMemorySessionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        Ok(self.store.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), SessionError> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.store.remove(key);
        Ok(())
    }
}
