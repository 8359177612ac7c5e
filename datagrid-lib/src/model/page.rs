//! Page results and response normalisation.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

use super::IdField;
use super::Row;
use super::RowId;

/// Pagination metadata attached to an envelope response.
///
/// Every field is optional; some backends send the counters as strings, so
/// numeric strings are accepted as well. Anything else (floats, negatives,
/// booleans, objects) reads as absent rather than failing the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Size of the whole filtered collection.
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: Option<usize>,
    /// 1-based page number the server returned.
    #[serde(default, deserialize_with = "lenient_count")]
    pub current_page: Option<usize>,
    /// 1-based number of the last page.
    #[serde(default, deserialize_with = "lenient_count")]
    pub last_page: Option<usize>,
    /// Page size the server applied.
    #[serde(default, deserialize_with = "lenient_count")]
    pub items_per_page: Option<usize>,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(usize),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => Some(n),
        Some(Count::Text(s)) => s.trim().parse().ok(),
        Some(Count::Other(_)) | None => None,
    })
}

/// Body of a collection response.
///
/// Endpoints either return a bare JSON array of rows or wrap the rows in an
/// envelope next to pagination metadata. Both shapes are normalised by
/// [`CollectionResponse::into_page`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CollectionResponse {
    /// `[{...}, {...}]`
    Rows(Vec<Row>),
    /// `{"data": [...], "pagination": {"total": 57, ...}}`
    Envelope {
        data: Vec<Row>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
}

impl CollectionResponse {
    /// Normalises the response into a [`PageResult`].
    ///
    /// A bare array counts its own rows. An envelope reports
    /// `pagination.total`, falling back to the row count when absent.
    pub fn into_page(self) -> PageResult {
        match self {
            Self::Rows(rows) => {
                let total = rows.len();
                PageResult::new(rows, total)
            }
            Self::Envelope { data, pagination } => {
                let total = pagination
                    .as_ref()
                    .and_then(|p| p.total)
                    .unwrap_or(data.len());
                let page = PageResult::new(data, total);
                match pagination {
                    Some(pagination) => page.with_pagination(pagination),
                    None => page,
                }
            }
        }
    }
}

/// One page of a server-driven table.
///
/// Produced fresh by every fetch and never mutated afterwards.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{CollectionResponse, PageResult};
///
/// let body = r#"{"data":[{"id":1}],"pagination":{"total":57}}"#;
/// let page = serde_json::from_str::<CollectionResponse>(body).unwrap().into_page();
///
/// assert_eq!(page.len(), 1);
/// assert_eq!(page.total_count(), 57);
/// assert_eq!(page.page_count(10), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    rows: Vec<Row>,
    total_count: usize,
    pagination: Option<Pagination>,
}

impl PageResult {
    /// Creates a page from its rows and the size of the whole collection.
    pub fn new(rows: Vec<Row>, total_count: usize) -> Self {
        Self {
            rows,
            total_count,
            pagination: None,
        }
    }

    /// The zero-result page every failed fetch degrades to.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attaches the server's pagination metadata.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Returns the rows of this page in server order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the page and returns the rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns the size of the whole filtered collection.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Returns the server's pagination metadata, if it sent any.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Returns the number of rows on this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of pages needed for `total_count` rows.
    ///
    /// A `page_size` of zero is treated as one.
    pub fn page_count(&self, page_size: usize) -> usize {
        self.total_count.div_ceil(page_size.max(1))
    }

    /// Returns the identifiers of the rows on this page, skipping rows
    /// without one.
    pub fn row_ids(&self, field: &IdField) -> Vec<RowId> {
        self.rows.iter().filter_map(|row| row.id(field)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> PageResult {
        serde_json::from_value::<CollectionResponse>(value)
            .unwrap()
            .into_page()
    }

    #[test]
    fn test_bare_array() {
        let page = parse(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(page.total_count(), 2);
        assert_eq!(
            page.row_ids(&IdField::Id),
            vec![RowId::from(1), RowId::from(2)]
        );
        assert!(page.pagination().is_none());
    }

    #[test]
    fn test_envelope_with_total() {
        let page = parse(json!({"data": [{"id": 1}], "pagination": {"total": 57}}));
        assert_eq!(page.rows(), &[Row::new().set("id", 1)]);
        assert_eq!(page.total_count(), 57);
    }

    #[test]
    fn test_envelope_without_pagination() {
        let page = parse(json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}]}));
        assert_eq!(page.total_count(), 3);
    }

    #[test]
    fn test_envelope_pagination_without_total() {
        let page = parse(json!({"data": [{"id": 1}], "pagination": {"current_page": 2}}));
        assert_eq!(page.total_count(), 1);
        assert_eq!(page.pagination().unwrap().current_page, Some(2));
    }

    #[test]
    fn test_pagination_accepts_numeric_strings() {
        let page = parse(json!({
            "data": [],
            "pagination": {"total": "120", "current_page": 3, "last_page": "12", "items_per_page": "10"}
        }));
        let pagination = page.pagination().unwrap();
        assert_eq!(page.total_count(), 120);
        assert_eq!(pagination.last_page, Some(12));
        assert_eq!(pagination.items_per_page, Some(10));
    }

    #[test]
    fn test_malformed_counters_read_as_absent() {
        let page = parse(json!({
            "data": [{"id": 1}],
            "pagination": {"total": 57.0, "current_page": true}
        }));
        assert_eq!(page.len(), 1);
        assert_eq!(page.total_count(), 1);
        assert_eq!(page.pagination().unwrap().current_page, None);

        for total in [json!(-1), json!({"n": 1}), json!("lots")] {
            let page = parse(json!({
                "data": [{"id": 1}, {"id": 2}],
                "pagination": {"total": total, "current_page": 2.0}
            }));
            assert_eq!(page.total_count(), 2);
        }

        let page = parse(json!({
            "data": [{"id": 1}],
            "pagination": {"total": 57, "last_page": -3}
        }));
        assert_eq!(page.total_count(), 57);
        assert_eq!(page.pagination().unwrap().last_page, None);
    }

    #[test]
    fn test_empty_array() {
        let page = parse(json!([]));
        assert!(page.is_empty());
        assert_eq!(page.total_count(), 0);
    }

    #[test]
    fn test_non_collection_body_is_rejected() {
        assert!(serde_json::from_value::<CollectionResponse>(json!({"message": "ok"})).is_err());
        assert!(serde_json::from_value::<CollectionResponse>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(PageResult::new(vec![], 0).page_count(10), 0);
        assert_eq!(PageResult::new(vec![], 10).page_count(10), 1);
        assert_eq!(PageResult::new(vec![], 11).page_count(10), 2);
        assert_eq!(PageResult::new(vec![], 3).page_count(0), 3);
    }
}
