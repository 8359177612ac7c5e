//! Session storage error types

/// Errors raised by a [`SessionStore`](crate::session::SessionStore).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backing database failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] async_sqlite::Error),

    /// A stored token could not be encoded or decoded.
    #[error("Session codec error: {0}")]
    Codec(#[from] bincode::Error),
}
