//! User-controlled table query state.

use std::collections::BTreeMap;

use super::QueryParams;
use super::Sort;

/// Dropdown value meaning "filter not applied".
pub const NO_FILTER: &str = "-1";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Everything the user can change about a server-driven table.
///
/// Changing the page size, the sort, the search text or any filter moves the
/// table back to the first page; only [`QueryState::set_page_index`] keeps
/// the rest of the state and moves between pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page_index: usize,
    page_size: usize,
    sort: Option<Sort>,
    search: String,
    column_filters: BTreeMap<String, String>,
    extra_filters: BTreeMap<String, String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    /// Creates a first-page query with the given page size.
    ///
    /// A page size of zero is raised to one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            sort: None,
            search: String::new(),
            column_filters: BTreeMap::new(),
            extra_filters: BTreeMap::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the 0-based page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns the page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Returns the active sort, if any.
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Returns the free-text search query.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns the value filtering `column`, if any.
    pub fn column_filter(&self, column: &str) -> Option<&str> {
        self.column_filters.get(column).map(String::as_str)
    }

    /// Returns the raw value of an extra filter, including [`NO_FILTER`].
    pub fn extra_filter(&self, name: &str) -> Option<&str> {
        self.extra_filters.get(name).map(String::as_str)
    }

    /// Returns `true` if any search text or filter narrows the collection.
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty()
            || !self.column_filters.is_empty()
            || self.extra_filters.values().any(|v| v != NO_FILTER)
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Moves to another page.
    pub fn set_page_index(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Changes the page size (clamped to at least one).
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, sort: Option<Sort>) {
        self.sort = sort;
        self.page_index = 0;
    }

    /// Sets the free-text search. An empty string clears it.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page_index = 0;
    }

    /// Sets or clears a per-column filter.
    pub fn set_column_filter(&mut self, column: impl Into<String>, value: Option<String>) {
        let column = column.into();
        match value {
            Some(value) => {
                self.column_filters.insert(column, value);
            }
            None => {
                self.column_filters.remove(&column);
            }
        }
        self.page_index = 0;
    }

    /// Sets a categorical filter such as `status` or `person_type`.
    ///
    /// [`NO_FILTER`] keeps the dropdown value but sends nothing.
    pub fn set_extra_filter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.extra_filters.insert(name.into(), value.into());
        self.page_index = 0;
    }

    /// Drops every filter and the search text, keeping sort and page size.
    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.column_filters.clear();
        self.extra_filters.clear();
        self.page_index = 0;
    }

    // =========================================================================
    // Builder-style mutators
    // =========================================================================

    /// Builder form of [`set_page_index`](Self::set_page_index).
    pub fn with_page_index(mut self, page_index: usize) -> Self {
        self.set_page_index(page_index);
        self
    }

    /// Builder form of [`set_page_size`](Self::set_page_size).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        let page_index = self.page_index;
        self.set_page_size(page_size);
        self.page_index = page_index;
        self
    }

    /// Builder form of [`set_sort`](Self::set_sort).
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Builder form of [`set_search`](Self::set_search).
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Builder form of [`set_column_filter`](Self::set_column_filter).
    pub fn with_column_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.column_filters.insert(column.into(), value.into());
        self
    }

    /// Builder form of [`set_extra_filter`](Self::set_extra_filter).
    pub fn with_extra_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_filters.insert(name.into(), value.into());
        self
    }

    // =========================================================================
    // Request building
    // =========================================================================

    /// Builds the query-string parameters of the collection request.
    ///
    /// - `page` is 1-based on the wire and always present, as is
    ///   `items_per_page`. The last representable index saturates.
    /// - `sort`/`order` only when a sort column is active.
    /// - `query` only for non-empty search text, sent verbatim.
    /// - `filter[<column>]` for every column filter.
    /// - extra filters unless their value is [`NO_FILTER`].
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push("page", self.page_index.saturating_add(1).to_string());
        params.push("items_per_page", self.page_size.to_string());

        if let Some(sort) = &self.sort {
            params.push("sort", sort.column.clone());
            params.push("order", sort.direction.as_str());
        }

        if !self.search.is_empty() {
            params.push("query", self.search.clone());
        }

        for (column, value) in &self.column_filters {
            params.push(format!("filter[{}]", column), value.clone());
        }

        for (name, value) in &self.extra_filters {
            if value != NO_FILTER {
                params.push(name.clone(), value.clone());
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Direction;

    #[test]
    fn test_pagination_is_one_based() {
        for (page_index, page_size) in [(0, 1), (0, 10), (4, 25), (99, 100)] {
            let params = QueryState::new(page_size)
                .with_page_index(page_index)
                .to_params();
            assert_eq!(params.get("page"), Some((page_index + 1).to_string().as_str()));
            assert_eq!(params.get("items_per_page"), Some(page_size.to_string().as_str()));
            assert_eq!(params.keys(), vec!["page", "items_per_page"]);
        }
    }

    #[test]
    fn test_sort_only_when_active() {
        let params = QueryState::default().to_params();
        assert!(!params.contains("sort"));
        assert!(!params.contains("order"));

        let params = QueryState::default().with_sort(Sort::desc("email")).to_params();
        assert_eq!(params.get("sort"), Some("email"));
        assert_eq!(params.get("order"), Some("desc"));
    }

    #[test]
    fn test_empty_search_is_not_sent() {
        let params = QueryState::default().with_search("").to_params();
        assert!(!params.contains("query"));

        let params = QueryState::default().with_search("  Acme ").to_params();
        assert_eq!(params.get("query"), Some("  Acme "));
    }

    #[test]
    fn test_column_filters() {
        let params = QueryState::default()
            .with_column_filter("name", "jo")
            .with_column_filter("city", "")
            .to_params();
        assert_eq!(params.get("filter[name]"), Some("jo"));
        assert_eq!(params.get("filter[city]"), Some(""));

        let mut state = QueryState::default().with_column_filter("name", "jo");
        state.set_column_filter("name", None);
        assert!(!state.to_params().contains("filter[name]"));
    }

    #[test]
    fn test_no_filter_sentinel() {
        let params = QueryState::default()
            .with_extra_filter("status", NO_FILTER)
            .to_params();
        assert!(!params.contains("status"));

        for value in ["0", "1", "active", ""] {
            let params = QueryState::default()
                .with_extra_filter("status", value)
                .to_params();
            assert_eq!(params.get("status"), Some(value));
        }
    }

    #[test]
    fn test_parameter_order() {
        let params = QueryState::new(20)
            .with_page_index(1)
            .with_sort(Sort::asc("name"))
            .with_search("x")
            .with_column_filter("b", "2")
            .with_column_filter("a", "1")
            .with_extra_filter("status", "1")
            .with_extra_filter("person_type", "2")
            .to_params();
        assert_eq!(
            params.keys(),
            vec![
                "page",
                "items_per_page",
                "sort",
                "order",
                "query",
                "filter[a]",
                "filter[b]",
                "person_type",
                "status",
            ]
        );
    }

    #[test]
    fn test_mutations_return_to_first_page() {
        let mut state = QueryState::default().with_page_index(3);
        state.set_search("abc");
        assert_eq!(state.page_index(), 0);

        state.set_page_index(2);
        state.set_sort(Some(Sort::asc("name")));
        assert_eq!(state.page_index(), 0);

        state.set_page_index(2);
        state.set_extra_filter("status", "1");
        assert_eq!(state.page_index(), 0);

        state.set_page_index(5);
        assert_eq!(state.page_index(), 5);
        assert_eq!(state.sort().unwrap().direction, Direction::Asc);
    }

    #[test]
    fn test_last_page_index_does_not_overflow() {
        let params = QueryState::new(usize::MAX)
            .with_page_index(usize::MAX)
            .to_params();
        assert_eq!(params.get("page"), Some(usize::MAX.to_string().as_str()));
        assert_eq!(params.get("items_per_page"), Some(usize::MAX.to_string().as_str()));

        let params = QueryState::default()
            .with_page_index(usize::MAX - 1)
            .to_params();
        assert_eq!(params.get("page"), Some(usize::MAX.to_string().as_str()));
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(QueryState::new(0).page_size(), 1);
        let mut state = QueryState::default();
        state.set_page_size(0);
        assert_eq!(state.page_size(), 1);
    }

    #[test]
    fn test_is_filtered() {
        assert!(!QueryState::default().is_filtered());
        assert!(!QueryState::default().with_extra_filter("status", NO_FILTER).is_filtered());
        assert!(QueryState::default().with_search("a").is_filtered());

        let mut state = QueryState::default().with_column_filter("name", "x");
        state.clear_filters();
        assert!(!state.is_filtered());
    }
}
