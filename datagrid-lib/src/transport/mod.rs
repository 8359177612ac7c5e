//! HTTP transport seam.
//!
//! The fetch adapter talks to the backend only through [`Transport`], so the
//! HTTP client can be swapped for a recording double in tests.

mod http;

pub use http::HttpTransport;
pub use http::HttpTransportBuilder;

use async_trait::async_trait;
use url::Url;

use crate::error::ApiError;

/// Issues GET requests against collection endpoints.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a GET to `url`, with `Authorization: Bearer <token>` when a
    /// token is given, and returns the body of a successful response.
    ///
    /// Non-success statuses are reported as [`ApiError::Http`].
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String, ApiError> {
        (**self).get(url, bearer).await
    }
}
