//! Server-driven table controller.
//!
//! [`TableController`] owns the per-table state: query, selection, the
//! currently displayed page and the refresh token. Every query change and
//! every [`bump`](TableController::bump) issues a [`FetchTicket`]; only the
//! result for the most recently issued ticket is ever displayed, so a slow
//! response can not overwrite a newer one.
//!
//! # Example
//!
//! ```ignore
//! use datagrid_lib::table::{TableConfig, TableController};
//!
//! let mut table = TableController::new(TableConfig::default());
//! table.load(&fetcher).await;
//!
//! // After creating a customer elsewhere:
//! table.bump_and_load(&fetcher).await;
//! ```

use crate::fetch::FetchStatus;
use crate::fetch::Fetched;
use crate::fetch::TableFetcher;
use crate::model::IdField;
use crate::model::PageResult;
use crate::model::Row;
use crate::model::RowId;
use crate::query::QueryState;
use crate::query::Sort;
use crate::query::DEFAULT_PAGE_SIZE;
use crate::selection::SelectionTracker;

/// Per-table settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Page size of a fresh or reset table.
    ///
    /// Default: 10
    pub default_page_size: usize,

    /// Field the selection is keyed by.
    ///
    /// Default: `id`
    pub id_field: IdField,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            id_field: IdField::Id,
        }
    }
}

impl TableConfig {
    /// Creates a new table config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Sets the identifier field.
    pub fn with_id_field(mut self, id_field: IdField) -> Self {
        self.id_field = id_field;
        self
    }

    /// Takes page size defaults and id field from a fetcher's collection.
    pub fn for_fetcher(fetcher: &TableFetcher) -> Self {
        Self::default().with_id_field(fetcher.id_field().clone())
    }
}

/// Whether a table is waiting for a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStatus {
    #[default]
    Idle,
    Fetching,
}

/// A fetch the controller asked for.
///
/// Carries the query snapshot to send and the generation it belongs to.
/// Hand it back to [`TableController::apply`] together with the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: QueryState,
}

impl FetchTicket {
    /// Returns the request generation, increasing with every ticket.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the query to fetch.
    pub fn query(&self) -> &QueryState {
        &self.query
    }
}

/// State of one server-driven table.
#[derive(Debug)]
pub struct TableController {
    config: TableConfig,
    query: QueryState,
    selection: SelectionTracker,
    page: PageResult,
    last_fetch: Option<FetchStatus>,
    refresh_token: u64,
    generation: u64,
    status: TableStatus,
}

impl TableController {
    /// Creates an idle table with default query state and no rows.
    pub fn new(config: TableConfig) -> Self {
        Self {
            query: QueryState::new(config.default_page_size),
            config,
            selection: SelectionTracker::new(),
            page: PageResult::empty(),
            last_fetch: None,
            refresh_token: 0,
            generation: 0,
            status: TableStatus::Idle,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the table settings.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns the current query state.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Returns the displayed page.
    pub fn page(&self) -> &PageResult {
        &self.page
    }

    /// Returns the displayed rows.
    pub fn rows(&self) -> &[Row] {
        self.page.rows()
    }

    /// Returns the size of the whole filtered collection.
    pub fn total_count(&self) -> usize {
        self.page.total_count()
    }

    /// Returns the number of pages at the current page size.
    pub fn page_count(&self) -> usize {
        self.page.page_count(self.query.page_size())
    }

    /// Returns the ids of the displayed rows.
    pub fn row_ids(&self) -> Vec<RowId> {
        self.page.row_ids(&self.config.id_field)
    }

    /// Returns the selection.
    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Returns the selection for direct manipulation.
    pub fn selection_mut(&mut self) -> &mut SelectionTracker {
        &mut self.selection
    }

    /// Returns whether a fetch is outstanding.
    pub fn status(&self) -> TableStatus {
        self.status
    }

    /// Returns how the last applied fetch ended.
    pub fn last_fetch(&self) -> Option<FetchStatus> {
        self.last_fetch
    }

    /// Returns the refresh token.
    pub fn refresh_token(&self) -> u64 {
        self.refresh_token
    }

    /// Returns the generation of the latest issued ticket.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // =========================================================================
    // Fetch lifecycle
    // =========================================================================

    /// Issues a ticket for the current query and enters `Fetching`.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.status = TableStatus::Fetching;
        FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        }
    }

    /// Installs the result of a fetch.
    ///
    /// Results for any ticket but the latest are dropped. Returns `true` if
    /// the page was installed.
    pub fn apply(&mut self, ticket: FetchTicket, fetched: Fetched) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping stale page for generation {} (latest {})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.last_fetch = Some(fetched.status());
        self.page = fetched.into_page();
        self.status = TableStatus::Idle;
        true
    }

    /// Invalidates the displayed rows and asks for the current page again.
    ///
    /// Used after a create, update or delete. Every call issues its own
    /// ticket; calls are never coalesced.
    pub fn bump(&mut self) -> FetchTicket {
        self.refresh_token += 1;
        self.page = PageResult::empty();
        self.begin_fetch()
    }

    /// Deselects deleted rows, then [`bump`](Self::bump)s.
    pub fn bump_after_delete(&mut self, deleted: &[RowId]) -> FetchTicket {
        self.selection.deselect(deleted);
        self.bump()
    }

    /// Returns the table to its initial state, as when the host mounts it
    /// under a new key: default query, no selection, no rows.
    pub fn reset(&mut self) -> FetchTicket {
        self.query = QueryState::new(self.config.default_page_size);
        self.selection.clear();
        self.page = PageResult::empty();
        self.last_fetch = None;
        self.begin_fetch()
    }

    /// Runs `ticket` through `fetcher` and applies the result.
    pub async fn execute(&mut self, ticket: FetchTicket, fetcher: &TableFetcher) -> bool {
        let fetched = fetcher.fetch(ticket.query()).await;
        self.apply(ticket, fetched)
    }

    /// Fetches the current query.
    pub async fn load(&mut self, fetcher: &TableFetcher) -> bool {
        let ticket = self.begin_fetch();
        self.execute(ticket, fetcher).await
    }

    /// [`bump`](Self::bump)s and fetches.
    pub async fn bump_and_load(&mut self, fetcher: &TableFetcher) -> bool {
        let ticket = self.bump();
        self.execute(ticket, fetcher).await
    }

    // =========================================================================
    // Query changes
    // =========================================================================

    /// Moves to another page.
    pub fn set_page_index(&mut self, page_index: usize) -> FetchTicket {
        self.query.set_page_index(page_index);
        self.begin_fetch()
    }

    /// Changes the page size.
    pub fn set_page_size(&mut self, page_size: usize) -> FetchTicket {
        self.query.set_page_size(page_size);
        self.begin_fetch()
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, sort: Option<Sort>) -> FetchTicket {
        self.query.set_sort(sort);
        self.begin_fetch()
    }

    /// Sets the free-text search.
    pub fn set_search(&mut self, search: impl Into<String>) -> FetchTicket {
        self.query.set_search(search);
        self.begin_fetch()
    }

    /// Sets or clears a column filter.
    pub fn set_column_filter(
        &mut self,
        column: impl Into<String>,
        value: Option<String>,
    ) -> FetchTicket {
        self.query.set_column_filter(column, value);
        self.begin_fetch()
    }

    /// Sets a categorical filter such as `status`.
    pub fn set_extra_filter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> FetchTicket {
        self.query.set_extra_filter(name, value);
        self.begin_fetch()
    }

    /// Drops the search text and every filter.
    pub fn clear_filters(&mut self) -> FetchTicket {
        self.query.clear_filters();
        self.begin_fetch()
    }

    // =========================================================================
    // Selection shortcuts
    // =========================================================================

    /// Toggles one row.
    pub fn toggle_row(&mut self, id: RowId) -> bool {
        self.selection.toggle(id)
    }

    /// Header checkbox: toggles every row on the displayed page.
    pub fn toggle_page(&mut self) -> bool {
        let ids = self.row_ids();
        self.selection.toggle_all(&ids)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::Entity;
    use crate::notify::NoticeQueue;
    use crate::testing::Reply;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    fn page(ids: &[i64], total: usize) -> Fetched {
        let rows = ids.iter().map(|&id| Row::new().set("id", id)).collect();
        Fetched::ok(PageResult::new(rows, total))
    }

    fn fetcher(transport: &Arc<RecordingTransport>) -> TableFetcher {
        TableFetcher::builder()
            .base_url("https://admin.example.com/api")
            .entity(Entity::Leads)
            .transport(transport.clone())
            .notifier(NoticeQueue::new())
            .build()
            .unwrap()
    }

    #[test]
    fn test_latest_ticket_wins() {
        let mut table = TableController::new(TableConfig::default());
        let first = table.set_page_index(1);
        let second = table.set_page_index(2);

        assert!(table.apply(second, page(&[3], 30)));
        assert!(!table.apply(first, page(&[2], 30)));

        assert_eq!(table.row_ids(), vec![RowId::from(3)]);
        assert_eq!(table.status(), TableStatus::Idle);
    }

    #[test]
    fn test_stale_result_keeps_fetching_state() {
        let mut table = TableController::new(TableConfig::default());
        let first = table.begin_fetch();
        let _second = table.begin_fetch();

        assert!(!table.apply(first, page(&[1], 1)));
        assert_eq!(table.status(), TableStatus::Fetching);
        assert!(table.rows().is_empty());
    }

    #[test]
    fn test_bump_drops_rows_and_counts() {
        let mut table = TableController::new(TableConfig::default());
        let ticket = table.begin_fetch();
        table.apply(ticket, page(&[1, 2], 2));

        let ticket = table.bump();
        assert_eq!(table.refresh_token(), 1);
        assert!(table.rows().is_empty());
        assert_eq!(table.status(), TableStatus::Fetching);
        assert_eq!(ticket.query(), table.query());
    }

    #[test]
    fn test_query_changes_issue_tickets() {
        let mut table = TableController::new(TableConfig::default());
        let ticket = table.set_search("acme");
        assert_eq!(ticket.query().to_params().get("query"), Some("acme"));

        let ticket = table.set_extra_filter("status", "2");
        assert_eq!(ticket.query().to_params().get("status"), Some("2"));
        assert_eq!(ticket.generation(), 2);

        let ticket = table.set_sort(Some(Sort::desc("created_at")));
        assert_eq!(ticket.query().to_params().get("order"), Some("desc"));

        let ticket = table.set_column_filter("email", Some("@corp".into()));
        assert_eq!(ticket.query().to_params().get("filter[email]"), Some("@corp"));

        let ticket = table.set_page_size(50);
        assert_eq!(ticket.query().to_params().get("items_per_page"), Some("50"));

        let ticket = table.clear_filters();
        assert!(!ticket.query().is_filtered());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let config = TableConfig::default().with_default_page_size(25);
        let mut table = TableController::new(config);
        table.set_search("x");
        table.set_page_index(4);
        table.toggle_row(RowId::from(1));

        let ticket = table.reset();

        assert_eq!(ticket.query(), &QueryState::new(25));
        assert!(table.selection().is_empty());
        assert!(table.last_fetch().is_none());
    }

    #[test]
    fn test_failed_fetch_shows_empty_page() {
        let mut table = TableController::new(TableConfig::default());
        let ticket = table.begin_fetch();
        table.apply(ticket, page(&[1], 1));

        let ticket = table.set_page_index(1);
        table.apply(
            ticket,
            Fetched::failed(FetchStatus::ConnectionError { status: None }),
        );

        assert!(table.rows().is_empty());
        assert_eq!(table.total_count(), 0);
        assert_eq!(table.status(), TableStatus::Idle);
        assert_eq!(
            table.last_fetch(),
            Some(FetchStatus::ConnectionError { status: None })
        );
    }

    #[test]
    fn test_toggle_page_uses_displayed_rows() {
        let mut table = TableController::new(TableConfig::default());
        let ticket = table.begin_fetch();
        table.apply(ticket, page(&[1, 2, 3], 3));
        table.toggle_row(RowId::from(2));

        assert!(table.toggle_page());
        assert_eq!(table.selection().len(), 3);
        assert!(!table.toggle_page());
        assert!(table.selection().is_empty());
    }

    #[test]
    fn test_selection_survives_bump_but_not_delete() {
        let mut table = TableController::new(TableConfig::default());
        table.toggle_row(RowId::from(1));
        table.toggle_row(RowId::from(2));

        table.bump();
        assert_eq!(table.selection().len(), 2);

        table.bump_after_delete(&[RowId::from(2)]);
        assert_eq!(table.selection().selected(), vec![RowId::from(1)]);
        assert_eq!(table.refresh_token(), 2);
    }

    #[tokio::test]
    async fn test_two_bumps_fetch_twice_with_same_params() {
        let transport = Arc::new(RecordingTransport::body(json!([{"id": 1}])));
        let fetcher = fetcher(&transport);
        let mut table = TableController::new(TableConfig::for_fetcher(&fetcher));
        table.set_search("lead");

        assert!(table.bump_and_load(&fetcher).await);
        assert!(table.bump_and_load(&fetcher).await);

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, calls[1].0);
        assert_eq!(table.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_back_to_back_bumps_only_apply_latest() {
        let transport = Arc::new(RecordingTransport::body(json!([{"id": 1}])));
        let fetcher = fetcher(&transport);
        let mut table = TableController::new(TableConfig::for_fetcher(&fetcher));
        table.set_extra_filter("status", "3");

        let first = table.bump();
        let second = table.bump();
        assert_eq!(table.refresh_token(), 2);
        assert_eq!(first.query(), second.query());

        let first_result = fetcher.fetch(first.query()).await;
        transport.set_reply(Reply::Body(json!([{"id": 2}]).to_string()));
        let second_result = fetcher.fetch(second.query()).await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, calls[1].0);

        // The older request resolves last and must not win.
        assert!(table.apply(second, second_result));
        assert!(!table.apply(first, first_result));
        assert_eq!(table.row_ids(), vec![RowId::from(2)]);
        assert_eq!(table.status(), TableStatus::Idle);
    }

    #[tokio::test]
    async fn test_load_then_failure() {
        let transport = Arc::new(RecordingTransport::body(
            json!({"data": [{"id": 1}, {"id": 2}], "pagination": {"total": 42}}),
        ));
        let fetcher = fetcher(&transport);
        let mut table = TableController::new(TableConfig::for_fetcher(&fetcher));

        assert!(table.load(&fetcher).await);
        assert_eq!(table.total_count(), 42);
        assert_eq!(table.page_count(), 5);

        transport.set_reply(Reply::Status(502));
        assert!(table.bump_and_load(&fetcher).await);
        assert!(table.rows().is_empty());
        assert_eq!(
            table.last_fetch(),
            Some(FetchStatus::ConnectionError { status: Some(502) })
        );
    }
}
