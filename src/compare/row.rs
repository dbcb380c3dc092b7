use thiserror::Error;

/// Metric families reported per program, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Instcount,
    SizeText,
    ExecTime,
    CompileTime,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 4] = [
        MetricFamily::Instcount,
        MetricFamily::SizeText,
        MetricFamily::ExecTime,
        MetricFamily::CompileTime,
    ];

    /// Column suffix used in the TSV projection.
    pub fn key(self) -> &'static str {
        match self {
            MetricFamily::Instcount => "instcount",
            MetricFamily::SizeText => "size.text",
            MetricFamily::ExecTime => "exec_time",
            MetricFamily::CompileTime => "compile_time",
        }
    }

    /// Row label used in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            MetricFamily::Instcount => "Instcount",
            MetricFamily::SizeText => "Size.text",
            MetricFamily::ExecTime => "Exec Time",
            MetricFamily::CompileTime => "Compile Time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Baseline,
    Variant,
    Diff,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Field::Baseline => "baseline",
            Field::Variant => "variant",
            Field::Diff => "diff",
        };
        f.write_str(s)
    }
}

/// Baseline, variant and percent diff for one metric family.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricRecord {
    pub baseline: f64,
    pub variant: f64,
    pub diff: f64,
    /// Signed infinity when the diff token was `inf%`; `diff` is then 0.0.
    pub diff_sentinel: Option<f64>,
}

impl MetricRecord {
    /// Diff as fed to summaries: sentinels stay infinite so geomeans skip them.
    pub fn summary_diff(&self) -> f64 {
        self.diff_sentinel.unwrap_or(self.diff)
    }
}

/// One program line of a comparison file. Always carries every family.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramRecord {
    pub program: String,
    pub metrics: [MetricRecord; 4],
}

impl ProgramRecord {
    pub fn metric(&self, family: MetricFamily) -> &MetricRecord {
        &self.metrics[family as usize]
    }
}

/// A field that the tolerant tokenizer resolved to 0.0.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenIssue {
    #[error("{family}: missing {field}")]
    Missing { family: &'static str, field: Field },

    #[error("{family}: sentinel {token:?} for {field}")]
    Sentinel {
        family: &'static str,
        field: Field,
        token: String,
    },

    #[error("{family}: cannot parse {token:?} as {field}")]
    Unparseable {
        family: &'static str,
        field: Field,
        token: String,
    },
}

/// Everything tolerated on one program line; fatal only in strict mode.
#[derive(Debug, Error)]
#[error("line {line} ({program}): {}", format_issues(.issues))]
pub struct LineIssues {
    pub line: usize,
    pub program: String,
    pub issues: Vec<TokenIssue>,
}

fn format_issues(issues: &[TokenIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of tokenizing one line: the record plus anything tolerated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub record: ProgramRecord,
    pub issues: Vec<TokenIssue>,
}
