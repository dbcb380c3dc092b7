use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

mod compare;
mod diagnostics;
mod failures;
mod output;
mod render;
mod report;
mod stats;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "experiment-report")]
#[command(about = "Analyze compiler transformation experiment logs", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group summary tables by run and rank runs per metric.
    Runs {
        log: String,

        /// JSON output path (default: the log path with a .json extension).
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[arg(long = "metric", default_values = ["Instcount", "Size.text"])]
        metrics: Vec<String>,
    },

    /// Summarize a per-program comparison file and write its TSV projection.
    Compare {
        input: String,

        /// TSV output path (default: the input path with a .tsv extension).
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Fail on any missing, sentinel or unparseable field instead of using 0.
        #[arg(long)]
        strict: bool,
    },

    /// Count known compiler failures per log file.
    Failures {
        log: String,

        #[arg(long, default_value = "errors_summary")]
        out_dir: String,
    },
}

fn print_run_ranking(runs: &[report::Run], metric: &str) {
    use report::Category;

    for (category, title, what) in [
        (Category::Smaller, "Greatest reduction", "smaller"),
        (Category::Larger, "Largest growth", "larger"),
    ] {
        match report::best_run(runs, metric, category) {
            Some(hit) => {
                let count = hit
                    .count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{} for {} (programs that got {}):", title, metric, what);
                println!(
                    "  {} => Count: {} Geomean: {}",
                    hit.header.unwrap_or("<no run header>"),
                    count,
                    hit.geomean
                );
            }
            None => println!("No {} geomean found in any '{}' run.", metric, what),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    diagnostics::init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Runs { log, out, metrics } => {
            let runs = report::parse_runs_file(&log)?;

            let out = out
                .map(PathBuf::from)
                .unwrap_or_else(|| output::sibling_path(&log, "json"));
            output::write_runs_json(&out, &runs)?;
            println!("All parsed runs written to {}", out.display());

            for metric in &metrics {
                print_run_ranking(&runs, metric);
            }
        }
        Commands::Compare { input, out, strict } => {
            let tokenizer = compare::RowTokenizer::new()?;
            let comparison = compare::parse_comparison_file(&input, &tokenizer)?;

            if strict && !comparison.issues.is_empty() {
                let listed: Vec<String> =
                    comparison.issues.iter().map(|i| format!("  {}", i)).collect();
                anyhow::bail!(
                    "{}\n{}",
                    diagnostics::error_message(format!(
                        "strict mode: {} line(s) in {} needed tolerant parsing",
                        comparison.issues.len(),
                        input
                    )),
                    listed.join("\n")
                );
            }
            for issue in &comparison.issues {
                tracing::debug!("{}", issue);
            }

            let out = out
                .map(PathBuf::from)
                .unwrap_or_else(|| output::sibling_path(&input, "tsv"));
            output::write_programs_tsv(&out, &comparison.records)?;
            println!("Wrote {}", out.display());

            let tables = render::build_summary(&comparison.records);
            print!("{}", render::render_summary(&tables));
        }
        Commands::Failures { log, out_dir } => {
            let summary = failures::classify_file(&log)?;
            let (grouped, counts) = output::write_failure_csvs(Path::new(&out_dir), &summary)?;
            println!("--> Summary written to: {}", grouped.display());
            println!("--> Error counts written to: {}", counts.display());
            println!(
                "--> Total files with at least one error: {}",
                summary.total_files()
            );
        }
    }

    Ok(())
}
