//! Classification of compiler failures in a batch transformation log.
//!
//! A line like `/work/build/foo/bar.log: ...` switches the current log file;
//! every later line is matched against a fixed list of failure patterns and
//! the matched text is recorded once per file.

use crate::Result;
use crate::diagnostics;

use anyhow::Context;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

const FAILURE_PATTERNS: [&str; 13] = [
    r"llvm::ProgramSlice::populateBBsWithInsts\(llvm::Function\*\)",
    r"get_data_dependences_for",
    r"appendBlockGatesToPhiParent",
    r"removeInstructions",
    r"Instruction does not dominate all uses!",
    r"PHINode should have one entry for each predecessor of its parent basic block!",
    r"PHI node has multiple entries for the same basic block with different incoming values!",
    r"Entry block to function must not have predecessors!",
    r"Basic Block in function '(.+)' does not have terminator!",
    r"Only PHI nodes may reference their own value!",
    r"Assertion\s`(.+)\sfailed\.",
    r"Referring to an argument in another function!",
    r"Referring to a basic block in another function!",
];

const LOG_FILE_RE: &str = r"^/.*?/(.*?\.log)";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FailureSummary {
    /// Log file -> distinct failure texts seen in it.
    pub per_file: BTreeMap<String, BTreeSet<String>>,
}

impl FailureSummary {
    pub fn total_files(&self) -> usize {
        self.per_file.len()
    }

    /// (failure text, number of files), most frequent first; ties by text.
    pub fn error_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for errors in self.per_file.values() {
            for e in errors {
                *counts.entry(e.as_str()).or_default() += 1;
            }
        }

        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(e, n)| (e.to_string(), n))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }
}

pub struct FailureClassifier {
    file_re: Regex,
    patterns: Vec<Regex>,
}

impl FailureClassifier {
    pub fn new() -> Result<Self> {
        let patterns = FAILURE_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            file_re: Regex::new(LOG_FILE_RE)?,
            patterns,
        })
    }

    pub fn classify(&self, text: &str) -> FailureSummary {
        let mut summary = FailureSummary::default();
        let mut current: Option<String> = None;

        for line in text.lines() {
            if let Some(caps) = self.file_re.captures(line) {
                current = caps.get(1).map(|m| m.as_str().to_string());
            }
            let Some(file) = &current else {
                continue;
            };

            for m in self.patterns.iter().filter_map(|p| p.find(line)) {
                summary
                    .per_file
                    .entry(file.clone())
                    .or_default()
                    .insert(m.as_str().to_string());
            }
        }

        tracing::info!(files = summary.total_files(), "classified failure log");
        summary
    }
}

pub fn classify_file(path: &str) -> Result<FailureSummary> {
    let text = fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read failure log {}", path)))?;
    Ok(FailureClassifier::new()?.classify(&text))
}
