//! Error types

mod api;
mod session;

pub use api::*;
pub use session::*;

/// Top-level error returned by fallible table operations.
///
/// Only two kinds ever reach the user: [`Error::AuthenticationRequired`]
/// and everything else, which is reported as a connection error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No bearer token is available, or the stored one has expired.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The request failed on the wire or the backend rejected it.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The persisted session could not be read or written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl Error {
    /// Returns the HTTP status code associated with this error, if any.
    ///
    /// A missing token maps to `401` even though no request was made.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::AuthenticationRequired => Some(401),
            Self::Api(e) => e.status_code(),
            Self::Session(_) => None,
        }
    }

    /// Returns `true` if the user has to log in again.
    pub fn is_auth_required(&self) -> bool {
        match self {
            Self::AuthenticationRequired => true,
            Self::Api(e) => e.status_code() == Some(401),
            Self::Session(_) => false,
        }
    }
}
