//! Console rendering of summary tables.

pub mod summary;
pub mod table;

pub use summary::{build_summary, render_summary};
