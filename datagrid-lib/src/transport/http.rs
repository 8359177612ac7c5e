//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use super::Transport;
use crate::error::ApiError;

/// [`Transport`] over a shared `reqwest` client.
///
/// Cheap to clone; clones share the connection pool. There is no retry
/// policy: a failed request is reported once and left to the caller.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use datagrid_lib::transport::HttpTransport;
///
/// let transport = HttpTransport::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a transport with a default client and no request timeout.
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            timeout: None,
        }
    }

    /// Creates a new builder for constructing a transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Returns the per-request timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String, ApiError> {
        let mut request = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, "application/json");

        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            Err(ApiError::http(status.as_u16(), message))
        }
    }
}

/// Builder for constructing an [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl HttpTransportBuilder {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the [`HttpTransport`].
    pub fn build(self) -> Result<HttpTransport, ApiError> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(HttpTransport {
            http_client,
            timeout: self.timeout,
        })
    }
}
