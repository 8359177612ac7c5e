//! Fetch adapter for server-driven tables.
//!
//! [`TableFetcher`] turns a [`QueryState`] into one GET against an entity
//! collection and normalises the answer into a [`PageResult`]. Its
//! [`fetch`](TableFetcher::fetch) never fails: errors are logged, reported
//! through the [`Notifier`] and degrade to an empty page.

use std::sync::Arc;

use url::Url;

use crate::error::ApiError;
use crate::error::Error;
use crate::model::CollectionResponse;
use crate::model::Entity;
use crate::model::IdField;
use crate::model::PageResult;
use crate::notify::LogNotifier;
use crate::notify::Notice;
use crate::notify::Notifier;
use crate::notify::AUTH_REQUIRED_MESSAGE;
use crate::notify::CONNECTION_ERROR_MESSAGE;
use crate::query::QueryState;
use crate::session::Session;
use crate::transport::HttpTransport;
use crate::transport::Transport;

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The page was loaded.
    Ok,
    /// No usable token; nothing was sent.
    AuthenticationRequired,
    /// The request failed or the backend rejected it.
    ConnectionError {
        /// HTTP status, when the backend answered at all.
        status: Option<u16>,
    },
}

/// Result of [`TableFetcher::fetch`]: always a page, plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    page: PageResult,
    status: FetchStatus,
}

impl Fetched {
    /// A successfully loaded page.
    pub fn ok(page: PageResult) -> Self {
        Self {
            page,
            status: FetchStatus::Ok,
        }
    }

    /// A failed fetch; the page is empty.
    pub fn failed(status: FetchStatus) -> Self {
        Self {
            page: PageResult::empty(),
            status,
        }
    }

    /// Returns `true` if the page was loaded.
    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Ok
    }

    /// Returns how the fetch ended.
    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Returns the HTTP status of a failed fetch.
    ///
    /// A missing token reports `401` even though no request was made.
    pub fn status_code(&self) -> Option<u16> {
        match self.status {
            FetchStatus::Ok => None,
            FetchStatus::AuthenticationRequired => Some(401),
            FetchStatus::ConnectionError { status } => status,
        }
    }

    /// Returns the page (empty on failure).
    pub fn page(&self) -> &PageResult {
        &self.page
    }

    /// Consumes the result and returns the page.
    pub fn into_page(self) -> PageResult {
        self.page
    }
}

/// Loads pages of one entity collection.
///
/// Cheap to clone; clones share the transport, notifier and session.
///
/// # Example
///
/// ```ignore
/// use datagrid_lib::fetch::TableFetcher;
/// use datagrid_lib::model::Entity;
/// use datagrid_lib::query::QueryState;
///
/// let fetcher = TableFetcher::builder()
///     .base_url("https://admin.example.com/api")
///     .entity(Entity::Customers)
///     .session(session)
///     .build()?;
///
/// let fetched = fetcher.fetch(&QueryState::default()).await;
/// println!("{} of {}", fetched.page().len(), fetched.page().total_count());
/// ```
#[derive(Clone)]
pub struct TableFetcher {
    inner: Arc<TableFetcherInner>,
}

struct TableFetcherInner {
    entity: Entity,
    collection_url: Url,
    id_field: IdField,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    session: Option<Session>,
}

impl TableFetcher {
    /// Creates a new builder for constructing a fetcher.
    pub fn builder() -> TableFetcherBuilder<Missing, Missing> {
        TableFetcherBuilder::new()
    }

    /// Returns the entity this fetcher loads.
    pub fn entity(&self) -> &Entity {
        &self.inner.entity
    }

    /// Returns the collection URL without query parameters.
    pub fn collection_url(&self) -> &Url {
        &self.inner.collection_url
    }

    /// Returns the identifier field of this collection's rows.
    pub fn id_field(&self) -> &IdField {
        &self.inner.id_field
    }

    /// Returns `true` if requests carry the session's bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_some()
    }

    /// Returns the full request URL for `query`.
    pub fn request_url(&self, query: &QueryState) -> Url {
        let mut url = self.inner.collection_url.clone();
        query.to_params().apply_to(&mut url);
        url
    }

    /// Loads one page, reporting failures through the notifier.
    ///
    /// Never returns an error: a failed fetch yields an empty page and a
    /// [`FetchStatus`] describing what went wrong.
    pub async fn fetch(&self, query: &QueryState) -> Fetched {
        match self.try_fetch(query).await {
            Ok(page) => Fetched::ok(page),
            Err(Error::AuthenticationRequired) => {
                log::warn!("{}: no usable session token", self.inner.entity);
                self.inner.notifier.notify(Notice::warning(AUTH_REQUIRED_MESSAGE));
                Fetched::failed(FetchStatus::AuthenticationRequired)
            }
            Err(Error::Api(e)) if e.status_code() == Some(401) => {
                log::warn!("{}: backend rejected the session token: {}", self.inner.entity, e);
                self.inner.notifier.notify(Notice::warning(AUTH_REQUIRED_MESSAGE));
                Fetched::failed(FetchStatus::AuthenticationRequired)
            }
            Err(Error::Session(e)) => {
                log::error!("{}: could not read session: {}", self.inner.entity, e);
                self.inner.notifier.notify(Notice::warning(AUTH_REQUIRED_MESSAGE));
                Fetched::failed(FetchStatus::AuthenticationRequired)
            }
            Err(Error::Api(e)) => {
                log::error!("{}: fetch failed: {}", self.inner.entity, e);
                self.inner.notifier.notify(Notice::error(CONNECTION_ERROR_MESSAGE));
                Fetched::failed(FetchStatus::ConnectionError {
                    status: e.status_code(),
                })
            }
        }
    }

    /// Loads one page, returning the underlying error on failure.
    ///
    /// Nothing is sent when the fetcher is authenticated and the session has
    /// no usable token.
    pub async fn try_fetch(&self, query: &QueryState) -> Result<PageResult, Error> {
        let token = match &self.inner.session {
            Some(session) => Some(session.token().await?.ok_or(Error::AuthenticationRequired)?),
            None => None,
        };

        let url = self.request_url(query);
        log::debug!("GET {}", url);

        let body = self
            .inner
            .transport
            .get(&url, token.as_ref().map(|t| t.access_token.as_str()))
            .await?;

        let response: CollectionResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::parse_with_body(e.to_string(), body.clone()))?;
        let page = response.into_page();

        if page.len() > query.page_size() {
            log::warn!(
                "{}: server returned {} rows for a page of {}",
                self.inner.entity,
                page.len(),
                query.page_size()
            );
        }
        log::debug!(
            "{}: loaded {} rows of {}",
            self.inner.entity,
            page.len(),
            page.total_count()
        );

        Ok(page)
    }
}

impl std::fmt::Debug for TableFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableFetcher")
            .field("entity", &self.inner.entity)
            .field("collection_url", &self.inner.collection_url.as_str())
            .field("id_field", &self.inner.id_field)
            .field("authenticated", &self.inner.session.is_some())
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`TableFetcher`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `base_url` - The API base URL
/// - `entity` - The collection to load
pub struct TableFetcherBuilder<U, E> {
    base_url: U,
    entity: E,
    id_field: Option<IdField>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    session: Option<Session>,
}

impl TableFetcherBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: Missing,
            entity: Missing,
            id_field: None,
            transport: None,
            notifier: None,
            session: None,
        }
    }
}

impl Default for TableFetcherBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TableFetcherBuilder<Missing, E> {
    /// Sets the API base URL, e.g. `https://admin.example.com/api`.
    pub fn base_url(self, url: impl Into<String>) -> TableFetcherBuilder<Set<String>, E> {
        TableFetcherBuilder {
            base_url: Set(url.into()),
            entity: self.entity,
            id_field: self.id_field,
            transport: self.transport,
            notifier: self.notifier,
            session: self.session,
        }
    }
}

impl<U> TableFetcherBuilder<U, Missing> {
    /// Sets the collection to load.
    pub fn entity(self, entity: Entity) -> TableFetcherBuilder<U, Set<Entity>> {
        TableFetcherBuilder {
            base_url: self.base_url,
            entity: Set(entity),
            id_field: self.id_field,
            transport: self.transport,
            notifier: self.notifier,
            session: self.session,
        }
    }
}

impl<U, E> TableFetcherBuilder<U, E> {
    /// Overrides the identifier field. Defaults to the entity's own.
    pub fn id_field(mut self, id_field: IdField) -> Self {
        self.id_field = Some(id_field);
        self
    }

    /// Sets the transport. Defaults to [`HttpTransport`].
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the notifier. Defaults to [`LogNotifier`].
    pub fn notifier<N: Notifier + 'static>(mut self, notifier: N) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Makes the fetcher authenticated: every request carries the session's
    /// bearer token.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }
}

impl TableFetcherBuilder<Set<String>, Set<Entity>> {
    /// Builds the [`TableFetcher`].
    ///
    /// Fails if the base URL and entity path do not form a valid URL.
    pub fn build(self) -> Result<TableFetcher, Error> {
        let entity = self.entity.0;
        let raw = format!("{}/{}/", self.base_url.0.trim_end_matches('/'), entity.path());
        let collection_url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;

        Ok(TableFetcher {
            inner: Arc::new(TableFetcherInner {
                id_field: self.id_field.unwrap_or_else(|| entity.id_field()),
                entity,
                collection_url,
                transport: self
                    .transport
                    .unwrap_or_else(|| Arc::new(HttpTransport::new())),
                notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
                session: self.session,
            }),
        })
    }
}
