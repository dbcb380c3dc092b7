//! Geometric means of percentage changes.
//!
//! Every value is a percent (12.6 means +12.6%). A value p becomes the growth
//! factor `1 + p/100`; the geomean of n factors is `(prod)^(1/n) - 1` and is
//! returned as a fraction.
//!
//! Values at or below -100% have no positive growth factor and are excluded
//! from the geomean, as are non-finite values. They still count towards the
//! sign categories and their percentages.

/// Values within this distance of -100% are treated as -100%.
const FLOOR_TOLERANCE: f64 = 1e-9;

/// Parse a numeric cell, tolerating a trailing `%`.
pub fn parse_percent(cell: &str) -> Option<f64> {
    let s = cell.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    s.parse::<f64>().ok()
}

fn is_valid_change(p: f64) -> bool {
    p.is_finite() && p > -100.0 + FLOOR_TOLERANCE
}

/// Geomean of percent changes, as a fraction. 0.0 when nothing is valid.
pub fn geomean(values: &[f64]) -> f64 {
    let mut n = 0usize;
    let mut log_sum = 0.0f64;
    for &p in values.iter().filter(|&&p| is_valid_change(p)) {
        log_sum += (1.0 + p / 100.0).ln();
        n += 1;
    }

    if n == 0 {
        return 0.0;
    }
    (log_sum / n as f64).exp() - 1.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorySummary {
    pub count: usize,
    /// Share of the whole series, including values excluded from geomeans.
    pub fraction: f64,
    pub geomean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesSummary {
    pub total: usize,
    pub positive: CategorySummary,
    pub negative: CategorySummary,
    pub zero: CategorySummary,
    pub geomean: f64,
}

fn partition(values: &[f64], total: usize, pred: impl Fn(f64) -> bool) -> CategorySummary {
    let part: Vec<f64> = values.iter().copied().filter(|&v| pred(v)).collect();
    let fraction = if total == 0 {
        0.0
    } else {
        part.len() as f64 / total as f64
    };
    CategorySummary {
        count: part.len(),
        fraction,
        geomean: geomean(&part),
    }
}

/// Sign partitions plus the overall geomean of one series.
pub fn summarize(values: &[f64]) -> SeriesSummary {
    let total = values.len();
    SeriesSummary {
        total,
        positive: partition(values, total, |v| v > 0.0),
        negative: partition(values, total, |v| v < 0.0),
        zero: partition(values, total, |v| v == 0.0),
        geomean: geomean(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn geomean_of_symmetric_changes() {
        let expected = (1.10f64 * 0.90).sqrt() - 1.0;
        assert_relative_eq!(geomean(&[10.0, -10.0]), expected, epsilon = 1e-12);
        assert!(geomean(&[10.0, -10.0]) < 0.0);
    }

    #[test]
    fn geomean_of_single_value_is_that_change() {
        assert_relative_eq!(geomean(&[-12.34]), -0.1234, epsilon = 1e-12);
        assert_relative_eq!(geomean(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn changes_at_or_below_minus_hundred_are_excluded() {
        assert_eq!(geomean(&[-150.0]), 0.0);
        assert_eq!(geomean(&[-100.0]), 0.0);
        assert_relative_eq!(geomean(&[-150.0, 20.0]), 0.20, epsilon = 1e-12);
        assert_relative_eq!(
            geomean(&[-100.0 + 1e-12, 20.0]),
            0.20,
            epsilon = 1e-12
        );
    }

    #[test]
    fn non_finite_values_are_excluded() {
        assert_relative_eq!(geomean(&[f64::INFINITY, 5.0]), 0.05, epsilon = 1e-12);
        assert_eq!(geomean(&[]), 0.0);
    }

    #[test]
    fn percent_cells_coerce_or_drop() {
        let cells = ["1.5%", " -2 ", "inf%", "n/a", "", "3e1", "-12.34 %"];
        let parsed: Vec<Option<f64>> = cells.iter().map(|c| parse_percent(c)).collect();
        assert_eq!(
            parsed,
            vec![Some(1.5), Some(-2.0), Some(f64::INFINITY), None, None, Some(30.0), Some(-12.34)]
        );
    }

    #[test]
    fn nan_is_excluded_from_geomean() {
        assert_relative_eq!(geomean(&[f64::NAN, 10.0]), 0.10, epsilon = 1e-12);
    }

    #[test]
    fn category_counts_cover_the_series() {
        let values = [10.0, -10.0, 0.0, -150.0, 0.0, 5.0];
        let s = summarize(&values);

        assert_eq!(s.total, 6);
        assert_eq!(s.positive.count + s.negative.count + s.zero.count, values.len());
        assert_eq!(s.negative.count, 2);
        assert_eq!(s.zero.count, 2);
        assert_relative_eq!(s.negative.fraction, 2.0 / 6.0);
        // -150 counts as negative but is excluded from the geomean.
        assert_relative_eq!(s.negative.geomean, -0.10, epsilon = 1e-12);
        assert_eq!(s.zero.geomean, 0.0);
    }

    #[test]
    fn empty_series_summary_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.positive.fraction, 0.0);
        assert_eq!(s.geomean, 0.0);
    }
}
