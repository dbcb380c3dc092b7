//! File writers. Every writer takes its destination explicitly.

use crate::Result;
use crate::compare::{MetricFamily, ProgramRecord};
use crate::diagnostics;
use crate::failures::FailureSummary;
use crate::report::Run;

use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUMMARY_CSV: &str = "errors_summary_grouped.csv";
pub const COUNTS_CSV: &str = "errors_counts.csv";

/// `input` with its extension replaced, e.g. `transform.log` -> `transform.json`.
pub fn sibling_path(input: &str, extension: &str) -> PathBuf {
    Path::new(input).with_extension(extension)
}

fn create(path: &Path) -> Result<File> {
    File::create(path)
        .with_context(|| diagnostics::error_message(format!("create {}", path.display())))
}

pub fn write_runs_json(path: &Path, runs: &[Run]) -> Result<()> {
    let mut out = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut out, runs)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

pub fn tsv_header() -> Vec<String> {
    let mut header = vec!["Program".to_string()];
    for family in MetricFamily::ALL {
        for field in ["baseline", "variant", "diff"] {
            header.push(format!("{} ({})", field, family.key()));
        }
    }
    header
}

/// One row per program: name, then baseline/variant/diff per family.
pub fn write_programs_tsv(path: &Path, records: &[ProgramRecord]) -> Result<()> {
    let mut w = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(create(path)?);

    w.write_record(tsv_header())?;
    for rec in records {
        let mut row = vec![rec.program.clone()];
        for m in &rec.metrics {
            row.extend([m.baseline, m.variant, m.diff].iter().map(f64::to_string));
        }
        w.write_record(&row)?;
    }
    w.flush()?;
    Ok(())
}

/// Write the per-file and per-failure CSVs into `dir`, creating it if needed.
/// Returns the two paths written.
pub fn write_failure_csvs(dir: &Path, summary: &FailureSummary) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| diagnostics::error_message(format!("create dir {}", dir.display())))?;

    let summary_path = dir.join(SUMMARY_CSV);
    let mut w = csv::Writer::from_writer(create(&summary_path)?);
    w.write_record(["file", "errors"])?;
    for (file, errors) in &summary.per_file {
        let joined = errors.iter().map(String::as_str).collect::<Vec<_>>().join("; ");
        w.write_record([file.as_str(), joined.as_str()])?;
    }
    // Blank separator line; csv would quote an empty record as `""`.
    w.flush()?;
    let mut file = w.into_inner().map_err(|e| e.into_error())?;
    file.write_all(b"\n")?;
    let mut w = csv::Writer::from_writer(file);
    let total = summary.total_files().to_string();
    w.write_record(["Total files with errors", total.as_str()])?;
    w.flush()?;

    let counts_path = dir.join(COUNTS_CSV);
    let mut w = csv::Writer::from_writer(create(&counts_path)?);
    w.write_record(["error", "file_count"])?;
    for (error, count) in summary.error_counts() {
        w.write_record([error, count.to_string()])?;
    }
    w.flush()?;

    Ok((summary_path, counts_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::row::MetricRecord;
    use crate::report::runs::parse_runs;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn sibling_path_swaps_extension() {
        assert_eq!(sibling_path("logs/transform.log", "json"), PathBuf::from("logs/transform.json"));
        assert_eq!(sibling_path("results", "tsv"), PathBuf::from("results.tsv"));
    }

    #[test]
    fn tsv_has_program_and_twelve_metric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut metrics = [MetricRecord::default(); 4];
        metrics[1] = MetricRecord {
            baseline: 4096.0,
            variant: 4000.0,
            diff: -2.34,
            diff_sentinel: None,
        };
        let records = vec![ProgramRecord {
            program: "pi".to_string(),
            metrics,
        }];

        write_programs_tsv(&path, &records).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split('\t').count(), 13);
        assert!(lines[0].starts_with("Program\tbaseline (instcount)\tvariant (instcount)\tdiff (instcount)"));
        assert_eq!(lines[1], "pi\t0\t0\t0\t4096\t4000\t-2.34\t0\t0\t0\t0\t0\t0");
    }

    #[test]
    fn runs_json_is_an_array_of_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.json");
        let runs = parse_runs("Programs that got smaller:\n| | Count |\n| Instcount | 1 |\n\n## Run: A\n");

        write_runs_json(&path, &runs).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["header"], "## Run: A");
        assert_eq!(value[0]["smaller"]["rows"][0]["Count"], "1");
    }

    #[test]
    fn failure_csvs_are_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("errors_summary");
        let mut summary = FailureSummary::default();
        summary.per_file.insert(
            "a.log".to_string(),
            BTreeSet::from(["removeInstructions".to_string(), "Only PHI nodes may reference their own value!".to_string()]),
        );

        let (grouped, counts) = write_failure_csvs(&out, &summary).unwrap();
        assert_eq!(
            fs::read_to_string(grouped).unwrap(),
            "file,errors\na.log,Only PHI nodes may reference their own value!; removeInstructions\n\nTotal files with errors,1\n"
        );
        let counts = fs::read_to_string(counts).unwrap();
        assert!(counts.starts_with("error,file_count\n"));
        assert!(counts.contains("removeInstructions,1\n"));
    }
}
