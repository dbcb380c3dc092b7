//! Comparison results: one free-text line per program with baseline,
//! variant and percent diff for each metric family.

pub mod parse;
pub mod row;

pub use parse::{RowTokenizer, parse_comparison_file};
pub use row::{MetricFamily, ProgramRecord};

/// Diff column of `family` across all programs, in file order. `inf%`
/// sentinels come back as infinities.
pub fn diff_series(records: &[ProgramRecord], family: MetricFamily) -> Vec<f64> {
    records.iter().map(|r| r.metric(family).summary_diff()).collect()
}
