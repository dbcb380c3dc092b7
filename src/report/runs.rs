//! Run aggregation for experiment logs.
//!
//! The experiment runner prints a run's result tables *before* its
//! `## Run: ...` header line, so each category block belongs to the nearest
//! header that follows it. Aggregation is done in two passes:
//! 1. `scan_log` collects category blocks and header positions.
//! 2. `resolve_header` maps each block end to the next header at or after it.

use crate::Result;
use crate::diagnostics;
use crate::report::table::{Table, parse_table};

use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

pub const RUN_HEADER_PREFIX: &str = "## Run: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Smaller,
    Larger,
    Unchanged,
    Overall,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Larger,
        Category::Smaller,
        Category::Unchanged,
        Category::Overall,
    ];

    /// The literal line that introduces a block of this category.
    pub fn marker(self) -> &'static str {
        match self {
            Category::Smaller => "Programs that got smaller:",
            Category::Larger => "Programs that got larger:",
            Category::Unchanged => "Programs that didn't change:",
            Category::Overall => "Overall metrics:",
        }
    }

    pub fn from_marker_line(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| line.starts_with(c.marker()))
    }
}

/// One experiment run, keyed by its trailing header line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    /// Trimmed `## Run: ...` line; `None` when no header follows the data.
    pub header: Option<String>,
    #[serde(flatten)]
    pub tables: BTreeMap<Category, Table>,
}

impl Run {
    fn new(header: Option<String>) -> Self {
        Self {
            header,
            tables: BTreeMap::new(),
        }
    }

    pub fn table(&self, category: Category) -> Option<&Table> {
        self.tables.get(&category)
    }
}

/// A category block sliced out of the log by the first pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub category: Category,
    pub lines: Vec<&'a str>,
    /// Index of the first line after the block.
    pub end: usize,
}

/// Output of the first pass.
#[derive(Debug, Default)]
pub struct LogScan<'a> {
    pub blocks: Vec<Block<'a>>,
    /// (line index, trimmed header line), ascending by index.
    pub headers: Vec<(usize, String)>,
}

/// First pass: slice category blocks and record header positions.
///
/// A block is every non-blank line directly after a marker; scanning resumes
/// after the block, so marker lines inside a block are not re-detected.
pub fn scan_log(text: &str) -> LogScan<'_> {
    let lines: Vec<&str> = text.lines().collect();
    let mut scan = LogScan::default();

    for (idx, line) in lines.iter().enumerate() {
        if line.starts_with(RUN_HEADER_PREFIX) {
            scan.headers.push((idx, line.trim().to_string()));
        }
    }

    let mut i = 0;
    while i < lines.len() {
        let Some(category) = Category::from_marker_line(lines[i].trim_end()) else {
            i += 1;
            continue;
        };

        i += 1;
        let start = i;
        while i < lines.len() && !lines[i].trim().is_empty() {
            i += 1;
        }

        scan.blocks.push(Block {
            category,
            lines: lines[start..i].to_vec(),
            end: i,
        });
    }

    scan
}

/// Second pass: the nearest header at or after `end`, if any.
pub fn resolve_header(headers: &[(usize, String)], end: usize) -> Option<&str> {
    let idx = headers.partition_point(|(pos, _)| *pos < end);
    headers.get(idx).map(|(_, h)| h.as_str())
}

/// Parse a whole experiment log into runs, in order of first appearance.
pub fn parse_runs(text: &str) -> Vec<Run> {
    let scan = scan_log(text);
    let mut runs: Vec<Run> = Vec::new();

    for block in &scan.blocks {
        let header = resolve_header(&scan.headers, block.end);
        if header.is_none() {
            tracing::debug!(
                category = ?block.category,
                end = block.end,
                "no run header after block; keeping it with a null header"
            );
        }

        let table = parse_table(block.lines.iter().copied());
        match runs.iter_mut().find(|r| r.header.as_deref() == header) {
            Some(run) => {
                run.tables.insert(block.category, table);
            }
            None => {
                let mut run = Run::new(header.map(str::to_string));
                run.tables.insert(block.category, table);
                runs.push(run);
            }
        }
    }

    tracing::info!(
        blocks = scan.blocks.len(),
        headers = scan.headers.len(),
        runs = runs.len(),
        "aggregated experiment log"
    );
    runs
}

/// Read and aggregate an experiment log file.
pub fn parse_runs_file(path: &str) -> Result<Vec<Run>> {
    let text = fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read experiment log {}", path)))?;
    Ok(parse_runs(&text))
}
