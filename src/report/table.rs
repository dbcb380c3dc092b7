//! Tokenizer for psql-style ASCII tables.
//!
//! Example block:
//! +-----------+---------+-----------+
//! |           |   Count | Geomean   |
//! |-----------+---------+-----------|
//! | Instcount |      42 | -12.34%   |
//! +-----------+---------+-----------+

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Synthetic name for the first column; it always holds the metric name.
pub const METRIC_COLUMN: &str = "Metric";

/// One data row, keyed by the owning table's header.
///
/// Cells are stored in header order and always form a prefix of the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(String, String)>,
}

impl Row {
    /// Pair `values` positionally with `header`, stopping at the shorter list.
    pub fn from_header(header: &[String], values: Vec<String>) -> Self {
        let cells = header.iter().cloned().zip(values).collect();
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first column.
    pub fn metric(&self) -> Option<&str> {
        self.cells.first().map(|(_, v)| v.as_str())
    }

    pub fn last_value(&self) -> Option<&str> {
        self.cells.last().map(|(_, v)| v.as_str())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// First row whose metric matches `metric`, ignoring ASCII case.
    pub fn find_metric(&self, metric: &str) -> Option<&Row> {
        self.rows
            .iter()
            .find(|r| r.metric().is_some_and(|m| m.eq_ignore_ascii_case(metric)))
    }
}

fn is_border(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '+' | '-' | '|' | ' '))
}

/// Split one content line into trimmed cells.
fn split_cells(line: &str) -> Vec<String> {
    line.trim()
        .trim_matches('|')
        .split('|')
        .map(|c| c.trim().to_string())
        .collect()
}

/// Parse one ASCII table block. Lines that are not table content are skipped.
pub fn parse_table<'a, I>(lines: I) -> Table
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = Table::default();
    let mut header: Option<Vec<String>> = None;

    for line in lines {
        let text = line.trim_end_matches(['\r', '\n']);
        if !text.starts_with('|') || is_border(text.trim()) {
            continue;
        }

        let mut cells = split_cells(text);
        match &header {
            None => {
                if let Some(first) = cells.first_mut() {
                    *first = METRIC_COLUMN.to_string();
                }
                header = Some(cells);
            }
            Some(h) => table.rows.push(Row::from_header(h, cells)),
        }
    }

    table.columns = header.unwrap_or_default();
    table
}
