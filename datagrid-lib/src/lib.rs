//! Server-driven data table client library
//!
//! Drives paginated, sortable, filterable admin tables (leads, customers,
//! vendors, users, invoices, quotations) whose rows live behind REST
//! collection endpoints.
//!
//! - [`query`] builds the wire parameters from the user's table state.
//! - [`fetch`] issues the request and normalises bare-array and envelope
//!   responses into a [`model::PageResult`].
//! - [`selection`] tracks checked rows by id.
//! - [`table`] ties it together with refresh and stale-response handling.

pub mod error;
pub mod fetch;
pub mod model;
pub mod notify;
pub mod query;
pub mod selection;
pub mod session;
pub mod table;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::Error;
pub use fetch::Fetched;
pub use fetch::TableFetcher;
pub use table::TableController;
