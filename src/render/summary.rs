//! Per-family category summaries of a comparison, as printable tables.

use crate::compare::{MetricFamily, ProgramRecord, diff_series};
use crate::render::table::render_psql;
use crate::report::table::{METRIC_COLUMN, Row, Table};
use crate::report::Category;
use crate::stats::{CategorySummary, SeriesSummary, summarize};

fn pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn columns(names: &[&str]) -> Vec<String> {
    std::iter::once(METRIC_COLUMN)
        .chain(names.iter().copied())
        .map(str::to_string)
        .collect()
}

fn category_row(columns: &[String], label: &str, c: &CategorySummary) -> Row {
    Row::from_header(
        columns,
        vec![
            label.to_string(),
            c.count.to_string(),
            pct(c.fraction),
            pct(c.geomean),
        ],
    )
}

/// Summary tables in print order: larger, smaller, unchanged, overall.
pub fn build_summary(records: &[ProgramRecord]) -> Vec<(Category, Table)> {
    let per_family: Vec<(MetricFamily, SeriesSummary)> = MetricFamily::ALL
        .into_iter()
        .map(|f| (f, summarize(&diff_series(records, f))))
        .collect();

    Category::ALL
        .into_iter()
        .map(|category| {
            let table = match category {
                Category::Overall => {
                    let columns = columns(&["Total Programs", "Geomean"]);
                    let rows = per_family
                        .iter()
                        .map(|(f, s)| {
                            Row::from_header(
                                &columns,
                                vec![f.label().to_string(), s.total.to_string(), pct(s.geomean)],
                            )
                        })
                        .collect();
                    Table { columns, rows }
                }
                _ => {
                    let columns = columns(&["Count", "% of total", "Geomean"]);
                    let rows = per_family
                        .iter()
                        .map(|(f, s)| {
                            let part = match category {
                                Category::Larger => &s.positive,
                                Category::Smaller => &s.negative,
                                _ => &s.zero,
                            };
                            category_row(&columns, f.label(), part)
                        })
                        .collect();
                    Table { columns, rows }
                }
            };
            (category, table)
        })
        .collect()
}

/// Marker line, then the table, per category; blocks separated by a blank line.
pub fn render_summary(tables: &[(Category, Table)]) -> String {
    tables
        .iter()
        .map(|(category, table)| format!("{}\n{}\n", category.marker(), render_psql(table)))
        .collect::<Vec<_>>()
        .join("\n")
}
