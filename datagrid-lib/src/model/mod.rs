//! Typed models

mod entity;
mod page;
mod row;

pub use entity::*;
pub use page::*;
pub use row::*;
