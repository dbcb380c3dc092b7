use crate::Result;
use crate::compare::row::{
    Field, LineIssues, MetricFamily, MetricRecord, ParsedRow, ProgramRecord, TokenIssue,
};
use crate::diagnostics;

use anyhow::Context;
use regex::Regex;
use std::fs;

/// Program names starting with these belong to statistics footers.
const SKIP_PREFIXES: [&str; 10] = [
    "Geomean", "Tests", "count", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Lines with fewer numeric tokens are not program rows.
const MIN_TOKENS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Number,
    Percent,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    kind: TokenKind,
}

/// Splits a comparison line into a program name and metric triples.
///
/// Expected shape (whitespace-separated):
/// program  (baseline variant diff%) x 4
///
/// Example:
/// MultiSource/Benchmarks/7zip/7zip-benchmark  1046011 1040126 -0.56%  ...
pub struct RowTokenizer {
    number: Regex,
    word: Regex,
}

impl RowTokenizer {
    pub fn new() -> Result<Self> {
        // number or inf, optionally signed, optionally followed by '%'
        const NUMBER_RE: &str =
            r#"^[-+]?(?:(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?|[iI][nN][fF])%?$"#;
        Ok(Self {
            number: Regex::new(NUMBER_RE)?,
            word: Regex::new(r"\S+")?,
        })
    }

    fn classify<'a>(&self, text: &'a str) -> Token<'a> {
        let kind = if !self.number.is_match(text) {
            TokenKind::Other
        } else if text.ends_with('%') {
            TokenKind::Percent
        } else {
            TokenKind::Number
        };
        Token { text, kind }
    }

    /// Split at the first numeric-looking token. `None` if there is no such
    /// token or nothing precedes it.
    fn split_program<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let first = self
            .word
            .find_iter(line)
            .find(|m| self.number.is_match(m.as_str()))?;
        let program = line[..first.start()].trim();
        if program.is_empty() {
            return None;
        }
        Some((program, &line[first.start()..]))
    }

    fn tokens<'a>(&self, rest: &'a str) -> Vec<Token<'a>> {
        rest.split_whitespace().map(|t| self.classify(t)).collect()
    }

    /// Tokenize one line. Sentinels, missing and unparseable fields become
    /// 0.0 and are listed in `issues`.
    pub fn tokenize(&self, line: &str) -> Option<ParsedRow> {
        let (program, rest) = self.split_program(line)?;
        let tokens = self.tokens(rest);

        let mut issues = Vec::new();
        let mut metrics = [MetricRecord::default(); 4];
        let mut cursor = 0usize;

        for (slot, family) in metrics.iter_mut().zip(MetricFamily::ALL) {
            let (baseline, next) = next_non_percent(&tokens, cursor);
            cursor = next;
            let (variant, next) = next_non_percent(&tokens, cursor);
            cursor = next;
            let diff = tokens.get(cursor);
            let diff_sentinel = diff.and_then(|t| sentinel(t.text));
            cursor = (cursor + 1).min(tokens.len());

            let mut resolve = |token: Option<&Token<'_>>, field: Field| {
                let (value, issue) = resolve_value(token, family.key(), field);
                issues.extend(issue);
                value
            };
            *slot = MetricRecord {
                baseline: resolve(baseline, Field::Baseline),
                variant: resolve(variant, Field::Variant),
                diff: resolve(diff, Field::Diff),
                diff_sentinel,
            };
        }

        Some(ParsedRow {
            record: ProgramRecord {
                program: program.to_string(),
                metrics,
            },
            issues,
        })
    }

    fn numeric_token_count(&self, rest: &str) -> usize {
        self.tokens(rest)
            .iter()
            .filter(|t| t.kind != TokenKind::Other)
            .count()
    }
}

/// First non-percentage token at or after `from`, and the index after it.
fn next_non_percent<'t, 'a>(tokens: &'t [Token<'a>], from: usize) -> (Option<&'t Token<'a>>, usize) {
    match tokens[from.min(tokens.len())..]
        .iter()
        .position(|t| t.kind != TokenKind::Percent)
    {
        Some(offset) => {
            let idx = from + offset;
            (tokens.get(idx), idx + 1)
        }
        None => (None, tokens.len()),
    }
}

/// `inf`, `+inf%`, `-INF` and the like, as a signed infinity.
fn sentinel(text: &str) -> Option<f64> {
    let bare = text.strip_suffix('%').unwrap_or(text);
    let unsigned = bare.trim_start_matches(['+', '-']);
    if !unsigned.eq_ignore_ascii_case("inf") {
        return None;
    }
    Some(if bare.starts_with('-') {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    })
}

fn resolve_value(
    token: Option<&Token<'_>>,
    family: &'static str,
    field: Field,
) -> (f64, Option<TokenIssue>) {
    let Some(token) = token else {
        return (0.0, Some(TokenIssue::Missing { family, field }));
    };

    if sentinel(token.text).is_some() {
        let issue = TokenIssue::Sentinel {
            family,
            field,
            token: token.text.to_string(),
        };
        return (0.0, Some(issue));
    }

    let bare = token.text.strip_suffix('%').unwrap_or(token.text);
    match bare.parse::<f64>() {
        Ok(v) if v.is_finite() => (v, None),
        _ => {
            let issue = TokenIssue::Unparseable {
                family,
                field,
                token: token.text.to_string(),
            };
            (0.0, Some(issue))
        }
    }
}

/// Program rows of one comparison file, plus the lines that needed tolerance.
#[derive(Debug, Default)]
pub struct Comparison {
    pub records: Vec<ProgramRecord>,
    pub issues: Vec<LineIssues>,
}

/// Parse comparison text. Blank lines, statistics footers and lines that
/// do not look like program rows are skipped.
pub fn parse_comparison(text: &str, tokenizer: &RowTokenizer) -> Comparison {
    let mut out = Comparison::default();

    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let Some((program, rest)) = tokenizer.split_program(line) else {
            tracing::debug!(line = lno, "no program row, skipping");
            continue;
        };
        if SKIP_PREFIXES.iter().any(|p| program.starts_with(p)) {
            continue;
        }
        if tokenizer.numeric_token_count(rest) < MIN_TOKENS {
            tracing::debug!(line = lno, program, "too few numeric tokens, skipping");
            continue;
        }

        let Some(parsed) = tokenizer.tokenize(line) else {
            continue;
        };
        if !parsed.issues.is_empty() {
            out.issues.push(LineIssues {
                line: lno,
                program: parsed.record.program.clone(),
                issues: parsed.issues,
            });
        }
        out.records.push(parsed.record);
    }

    tracing::info!(
        programs = out.records.len(),
        tolerated = out.issues.len(),
        "parsed comparison results"
    );
    out
}

/// Read and parse a comparison results file.
pub fn parse_comparison_file(path: &str, tokenizer: &RowTokenizer) -> Result<Comparison> {
    let text = fs::read_to_string(path).with_context(|| {
        diagnostics::error_message(format!("read comparison file {}", path))
    })?;
    Ok(parse_comparison(&text, tokenizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenizer() -> RowTokenizer {
        RowTokenizer::new().unwrap()
    }

    #[test]
    fn single_triple_parses_literally() {
        let row = tokenizer().tokenize("ProgA 100 90 -10%").unwrap();
        let rec = row.record.metric(MetricFamily::Instcount);
        assert_eq!(row.record.program, "ProgA");
        assert_eq!(
            *rec,
            MetricRecord {
                baseline: 100.0,
                variant: 90.0,
                diff: -10.0,
                diff_sentinel: None,
            }
        );
        // The other families are zero-filled, not absent.
        assert_eq!(*row.record.metric(MetricFamily::CompileTime), MetricRecord::default());
        assert_eq!(row.issues.len(), 9);
    }

    #[test]
    fn full_row_fills_every_family() {
        let line = "SingleSource/Benchmarks/Misc/pi  1200 1100 -8.33%  4096 4000 -2.34%  1.5 1.2 -20%  0.30 0.33 10%";
        let row = tokenizer().tokenize(line).unwrap();

        assert!(row.issues.is_empty());
        assert_eq!(row.record.program, "SingleSource/Benchmarks/Misc/pi");
        assert_eq!(row.record.metric(MetricFamily::SizeText).diff, -2.34);
        assert_eq!(row.record.metric(MetricFamily::ExecTime).baseline, 1.5);
        assert_eq!(
            *row.record.metric(MetricFamily::CompileTime),
            MetricRecord {
                baseline: 0.30,
                variant: 0.33,
                diff: 10.0,
                diff_sentinel: None,
            }
        );
    }

    #[test]
    fn program_name_may_contain_spaces_and_digits() {
        let row = tokenizer()
            .tokenize("test-suite :: 2mm v2 10 9 -10%")
            .unwrap();
        assert_eq!(row.record.program, "test-suite :: 2mm v2");
    }

    #[test]
    fn inf_resolves_to_zero_with_sentinel_issue() {
        let row = tokenizer().tokenize("P 0 12 inf% 5 5 0.00%").unwrap();
        let inst = row.record.metric(MetricFamily::Instcount);
        assert_eq!(inst.diff, 0.0);
        assert_eq!(inst.diff_sentinel, Some(f64::INFINITY));
        assert_eq!(inst.variant, 12.0);
        assert_eq!(
            row.issues[0],
            TokenIssue::Sentinel {
                family: "instcount",
                field: Field::Diff,
                token: "inf%".to_string()
            }
        );
        assert_eq!(row.record.metric(MetricFamily::SizeText).baseline, 5.0);
    }

    #[test]
    fn bare_inf_counts_as_value_token() {
        let row = tokenizer().tokenize("P inf 3 -1%").unwrap();
        let inst = row.record.metric(MetricFamily::Instcount);
        assert_eq!((inst.baseline, inst.variant, inst.diff), (0.0, 3.0, -1.0));
        assert_eq!(inst.diff_sentinel, None);
    }

    #[test]
    fn stray_percentages_are_skipped_for_baseline_and_variant() {
        let row = tokenizer().tokenize("P 5% 100 7% 90 -10%").unwrap();
        let inst = row.record.metric(MetricFamily::Instcount);
        assert_eq!((inst.baseline, inst.variant, inst.diff), (100.0, 90.0, -10.0));
    }

    #[test]
    fn unparseable_token_resolves_to_zero() {
        let row = tokenizer().tokenize("P 100 n/a -10%").unwrap();
        let inst = row.record.metric(MetricFamily::Instcount);
        assert_eq!((inst.baseline, inst.variant, inst.diff), (100.0, 0.0, -10.0));
        assert!(matches!(
            row.issues[0],
            TokenIssue::Unparseable {
                field: Field::Variant,
                ..
            }
        ));
    }

    #[test]
    fn lines_without_program_or_numbers_are_misses() {
        let t = tokenizer();
        assert!(t.tokenize("no numbers here").is_none());
        assert!(t.tokenize("100 90 -10%").is_none());
        assert!(t.tokenize("").is_none());
    }

    #[test]
    fn comparison_skips_footers_and_short_lines() {
        let text = "\
Program   baseline daedalus diff
A   10 9 -10%   100 100 0%
Tests: 2

B   10 11 10%   100 50 -50%
Geomean  1 1 0% 1 1 0%
count    2 2 2  2 2 2
25%      1 1 1  1 1 1
C   1 2
";
        let cmp = parse_comparison(text, &tokenizer());
        let names: Vec<&str> = cmp.records.iter().map(|r| r.program.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(cmp.records[1].metric(MetricFamily::SizeText).diff, -50.0);

        // Exec and compile time are absent on both rows.
        assert_eq!(cmp.issues.len(), 2);
        assert_eq!(cmp.issues[0].line, 2);
        assert_eq!(cmp.issues[0].issues.len(), 6);
    }

    #[test]
    fn line_issues_render_readably() {
        let issues = LineIssues {
            line: 3,
            program: "P".to_string(),
            issues: vec![
                TokenIssue::Missing {
                    family: "exec_time",
                    field: Field::Baseline,
                },
                TokenIssue::Sentinel {
                    family: "instcount",
                    field: Field::Diff,
                    token: "inf%".to_string(),
                },
            ],
        };
        assert_eq!(
            issues.to_string(),
            "line 3 (P): exec_time: missing baseline; instcount: sentinel \"inf%\" for diff"
        );
    }
}
