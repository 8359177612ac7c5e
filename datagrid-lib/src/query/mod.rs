//! Query state and request building.
//!
//! A [`QueryState`] captures everything the user can change about a table
//! (page, page size, sort, search text, filters). [`QueryState::to_params`]
//! turns it into the wire parameters of a collection request.
//!
//! # Example
//!
//! ```
//! use datagrid_lib::query::{QueryState, Sort};
//!
//! let query = QueryState::default()
//!     .with_page_index(2)
//!     .with_sort(Sort::desc("created_at"))
//!     .with_search("acme");
//!
//! let params = query.to_params();
//! assert_eq!(params.get("page"), Some("3"));
//! assert_eq!(params.get("order"), Some("desc"));
//! assert_eq!(params.get("query"), Some("acme"));
//! ```

mod order;
mod params;
mod state;

pub use order::Direction;
pub use order::Sort;
pub use params::QueryParams;
pub use state::DEFAULT_PAGE_SIZE;
pub use state::NO_FILTER;
pub use state::QueryState;
