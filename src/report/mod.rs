//! Experiment logs: ASCII summary tables grouped under `## Run: ...` headers.

pub mod query;
pub mod runs;
pub mod table;

pub use query::best_run;
pub use runs::{Category, Run, parse_runs_file};
pub use table::Table;
