//! SQLite-backed persistent session store.

use std::path::Path;

use async_sqlite::rusqlite;
use async_sqlite::rusqlite::OptionalExtension;
use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_trait::async_trait;
use chrono::Utc;

use super::SessionStore;
use crate::error::SessionError;

/// A session store persisted in a SQLite database file.
///
/// The token survives process restarts, the way a browser keeps it in local
/// storage between page loads.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::session::SqliteSessionStore;
///
/// let store = SqliteSessionStore::open("session.db").await?;
/// ```
pub struct SqliteSessionStore {
    client: Client,
}

impl SqliteSessionStore {
    /// Opens (or creates) a session database at the specified path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    /// Opens an in-memory session database.
    pub async fn open_in_memory() -> Result<Self, SessionError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;

        Self::init_schema(&client).await?;

        Ok(Self { client })
    }

    async fn init_schema(client: &Client) -> Result<(), SessionError> {
        client
            .conn(|conn| {
                conn.execute(
                    "CREATE TABLE IF NOT EXISTS session (
                        key TEXT PRIMARY KEY,
                        value BLOB NOT NULL,
                        updated_at INTEGER NOT NULL
                    )",
                    [],
                )
                .map(|_| ())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        let key = key.to_string();

        let value = self
            .client
            .conn(move |conn| {
                conn.query_row(
                    "SELECT value FROM session WHERE key = ?",
                    [key],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()
            })
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), SessionError> {
        let key = key.to_string();
        let updated_at = Utc::now().timestamp();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO session (key, value, updated_at) VALUES (?, ?, ?)",
                    rusqlite::params![key, value, updated_at],
                )
            })
            .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let key = key.to_string();

        self.client
            .conn(move |conn| conn.execute("DELETE FROM session WHERE key = ?", [key]))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = SqliteSessionStore::open_in_memory().await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", b"one".to_vec()).await.unwrap();
        store.set("k", b"two".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        {
            let store = SqliteSessionStore::open(&path).await.unwrap();
            store.set("auth_token", vec![1, 2, 3]).await.unwrap();
        }

        let store = SqliteSessionStore::open(&path).await.unwrap();
        assert_eq!(store.get("auth_token").await.unwrap(), Some(vec![1, 2, 3]));
    }
}
