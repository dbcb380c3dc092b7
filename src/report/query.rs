//! Cross-run ranking of per-metric geomeans.

use crate::report::runs::{Category, Run};
use crate::stats::parse_percent;

/// A (run, count, geomean) hit for one metric in one category table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHit<'a> {
    pub header: Option<&'a str>,
    pub count: Option<u64>,
    /// Geomean in percent, as printed in the table.
    pub geomean: f64,
}

/// Every run whose `category` table has a row for `metric`, in run order.
///
/// The geomean comes from the `Geomean` column, or the last cell when the
/// table has no such column. Rows whose geomean does not parse are skipped.
pub fn metric_geomeans<'a>(runs: &'a [Run], metric: &str, category: Category) -> Vec<MetricHit<'a>> {
    runs.iter()
        .filter_map(|run| {
            let row = run.table(category)?.find_metric(metric)?;
            let cell = row.get("Geomean").or_else(|| row.last_value())?;
            let geomean = parse_percent(cell)?;
            let count = row.get("Count").and_then(|c| c.trim().parse::<u64>().ok());
            Some(MetricHit {
                header: run.header.as_deref(),
                count,
                geomean,
            })
        })
        .collect()
}

/// Greatest reduction (`Smaller`, minimum geomean) or largest growth
/// (`Larger`, maximum geomean). Ties keep the earliest run.
pub fn best_run<'a>(runs: &'a [Run], metric: &str, category: Category) -> Option<MetricHit<'a>> {
    let hits = metric_geomeans(runs, metric, category);
    let prefer_lower = !matches!(category, Category::Larger);

    hits.into_iter().fold(None, |best, hit| match best {
        None => Some(hit),
        Some(b) => {
            let better = if prefer_lower {
                hit.geomean < b.geomean
            } else {
                hit.geomean > b.geomean
            };
            Some(if better { hit } else { b })
        }
    })
}
