#![warn(missing_docs)]
//! perfcmp CLI Library
//!
//! Command-line front end: parses arguments, layers `perfcmp.toml` under the
//! CLI flags, loads results from disk and renders the report.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     perfcmp_cli::run()
//! }
//! ```

mod config;
mod loader;

pub use config::*;
pub use loader::{
    BY_BOOT_DIR, LoadError, is_results_filename, load_boot, load_boots, load_results_dir,
    parse_process_run, read_snapshot_total,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use perfcmp_logic::{
    AggregationConfig, ValidationConfig, aggregate_boots, compare_results, compare_sizes,
    validate_boots,
};
use perfcmp_report::{OutputFormat, Report, ReportBody, ReportMeta, render};
use std::io::Write;
use std::path::PathBuf;

/// perfcmp CLI arguments
#[derive(Parser, Debug)]
#[command(name = "perfcmp")]
#[command(
    author,
    version,
    about = "perfcmp - compare performance test results gathered across reboots"
)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: human, json, csv
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Significance level for confidence intervals (default 0.01, i.e. 99%)
    #[arg(long, global = true)]
    pub alpha: Option<f64>,

    /// Values dropped from the start of each process run as warm-up
    #[arg(long, global = true)]
    pub warmup_runs: Option<usize>,

    /// Configuration file (default: discover perfcmp.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two sets of perf test results
    ComparePerf {
        /// Results directory for the "before" build (contains by_boot/)
        results_dir_before: PathBuf,
        /// Results directory for the "after" build (contains by_boot/)
        results_dir_after: PathBuf,
        /// Exit with status 1 if any test case got slower
        #[arg(long)]
        fail_on_regression: bool,
    },
    /// Output statistics given multiple sets of perf test results from the
    /// same build, to check how often the comparison falsely reports that a
    /// test case regressed or improved
    ValidatePerfcompare {
        /// Number of boots to put in each group; should match the number of
        /// boots per revision used for real comparisons
        #[arg(short = 'g', long)]
        group_size: Option<usize>,
        /// Per-boot results directories or tar archives
        #[arg(required = true)]
        results_dirs: Vec<PathBuf>,
    },
    /// Compare total blob sizes of two system snapshot files
    CompareSizes {
        /// Snapshot of the "before" build
        snapshot_before: PathBuf,
        /// Snapshot of the "after" build
        snapshot_after: PathBuf,
    },
}

/// Run the perfcmp CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the perfcmp CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => PerfcmpConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PerfcmpConfig::discover()?.unwrap_or_default(),
    };

    let format = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse::<OutputFormat>()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let outcome = execute(&cli, &config)?;
    let output = render(&outcome.report, format)?;

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        file.write_all(output.as_bytes())?;
        eprintln!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if outcome.fail {
        eprintln!("\nPerformance regression detected");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "perfcmp=debug" } else { "perfcmp=info" };
    // A subscriber may already be installed when embedded in another binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Result of running a command, before rendering
pub struct Outcome {
    /// Report to render
    pub report: Report,
    /// Whether the process should exit with a failure status
    pub fail: bool,
}

/// Build the aggregation config by layering: perfcmp.toml defaults → CLI overrides.
pub fn build_aggregation_config(cli: &Cli, config: &PerfcmpConfig) -> AggregationConfig {
    let mut aggregation = config.aggregation();
    if let Some(alpha) = cli.alpha {
        aggregation.alpha = alpha;
    }
    if let Some(warmup_runs) = cli.warmup_runs {
        aggregation.warmup_runs = warmup_runs;
    }
    aggregation
}

/// Run the selected command and build its report.
pub fn execute(cli: &Cli, config: &PerfcmpConfig) -> anyhow::Result<Outcome> {
    let aggregation = build_aggregation_config(cli, config);
    let stats_meta = || ReportMeta::new(Some(aggregation.alpha), Some(aggregation.warmup_runs));

    match &cli.command {
        Commands::ComparePerf {
            results_dir_before,
            results_dir_after,
            fail_on_regression,
        } => {
            let before = load_results_dir(results_dir_before)?;
            let after = load_results_dir(results_dir_after)?;
            tracing::info!(
                before_boots = before.len(),
                after_boots = after.len(),
                "loaded results"
            );

            let before = aggregate_boots(&before, &aggregation).with_context(|| {
                format!("aggregating {}", results_dir_before.display())
            })?;
            let after = aggregate_boots(&after, &aggregation)
                .with_context(|| format!("aggregating {}", results_dir_after.display()))?;

            let comparison = compare_results(&before, &after);
            let fail = *fail_on_regression && comparison.has_regressions();
            Ok(Outcome {
                report: Report::new(stats_meta(), ReportBody::ComparePerf(comparison)),
                fail,
            })
        }
        Commands::ValidatePerfcompare {
            group_size,
            results_dirs,
        } => {
            let group_size = group_size.or(config.validate.group_size).ok_or_else(|| {
                anyhow::anyhow!("--group-size is required (or set validate.group_size in perfcmp.toml)")
            })?;
            let boots = load_boots(results_dirs)?;
            let validation = validate_boots(
                &boots,
                &ValidationConfig {
                    group_size,
                    aggregation,
                },
            )?;
            Ok(Outcome {
                report: Report::new(stats_meta(), ReportBody::ValidatePerfcompare(validation)),
                fail: false,
            })
        }
        Commands::CompareSizes {
            snapshot_before,
            snapshot_after,
        } => {
            let before = read_snapshot_total(snapshot_before)?;
            let after = read_snapshot_total(snapshot_after)?;
            Ok(Outcome {
                report: Report::new(
                    ReportMeta::new(None, None),
                    ReportBody::CompareSizes(compare_sizes(before, after)),
                ),
                fail: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compare_perf() {
        let cli = Cli::try_parse_from([
            "perfcmp",
            "compare-perf",
            "before",
            "after",
            "--fail-on-regression",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format.as_deref(), Some("json"));
        match cli.command {
            Commands::ComparePerf {
                results_dir_before,
                results_dir_after,
                fail_on_regression,
            } => {
                assert_eq!(results_dir_before, PathBuf::from("before"));
                assert_eq!(results_dir_after, PathBuf::from("after"));
                assert!(fail_on_regression);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate() {
        let cli =
            Cli::try_parse_from(["perfcmp", "validate-perfcompare", "-g", "3", "b0", "b1", "b2"])
                .unwrap();
        match cli.command {
            Commands::ValidatePerfcompare {
                group_size,
                results_dirs,
            } => {
                assert_eq!(group_size, Some(3));
                assert_eq!(results_dirs.len(), 3);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_validate_requires_dirs() {
        assert!(Cli::try_parse_from(["perfcmp", "validate-perfcompare", "-g", "3"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "perfcmp",
            "--alpha",
            "0.05",
            "compare-sizes",
            "a.snapshot",
            "b.snapshot",
        ])
        .unwrap();
        let mut config = PerfcmpConfig::default();
        config.stats.warmup_runs = 2;

        let aggregation = build_aggregation_config(&cli, &config);
        assert_eq!(aggregation.alpha, 0.05);
        assert_eq!(aggregation.warmup_runs, 2);
    }

    #[test]
    fn test_validate_group_size_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs: Vec<String> = (0..4)
            .map(|i| {
                let dir = tmp.path().join(format!("boot{i}"));
                std::fs::create_dir_all(&dir).unwrap();
                let value = 100 + i;
                std::fs::write(
                    dir.join("t_process0.json"),
                    format!(r#"[{{"label": "t", "values": [500, {value}]}}]"#),
                )
                .unwrap();
                dir.display().to_string()
            })
            .collect();

        let mut args = vec!["perfcmp".to_string(), "validate-perfcompare".to_string()];
        args.extend(dirs);
        let cli = Cli::try_parse_from(args).unwrap();

        let mut config = PerfcmpConfig::default();
        assert!(execute(&cli, &config).is_err());

        config.validate.group_size = Some(2);
        let outcome = execute(&cli, &config).unwrap();
        match outcome.report.result {
            ReportBody::ValidatePerfcompare(report) => {
                assert_eq!(report.group_count, 2);
                assert_eq!(report.test_case_count(), 1);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    /// Results directory whose boots each ran "t" once with the given value
    fn results_dir(root: &std::path::Path, name: &str, values: &[f64]) -> PathBuf {
        let dir = root.join(name);
        for (i, value) in values.iter().enumerate() {
            let boot = dir.join(BY_BOOT_DIR).join(format!("boot{i}"));
            std::fs::create_dir_all(&boot).unwrap();
            std::fs::write(
                boot.join("t_process0.json"),
                format!(r#"[{{"label": "t", "values": [500, {value}]}}]"#),
            )
            .unwrap();
        }
        dir
    }

    fn compare_cli(before: &std::path::Path, after: &std::path::Path, fail: bool) -> Cli {
        let mut args = vec![
            "perfcmp".to_string(),
            "compare-perf".to_string(),
            before.display().to_string(),
            after.display().to_string(),
        ];
        if fail {
            args.push("--fail-on-regression".to_string());
        }
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_fail_on_regression() {
        let tmp = tempfile::tempdir().unwrap();
        let before = results_dir(tmp.path(), "before", &[98.0, 100.0, 102.0]);
        let slower = results_dir(tmp.path(), "slower", &[128.0, 130.0, 132.0]);
        let faster = results_dir(tmp.path(), "faster", &[68.0, 70.0, 72.0]);
        let config = PerfcmpConfig::default();

        assert!(execute(&compare_cli(&before, &slower, true), &config).unwrap().fail);
        assert!(!execute(&compare_cli(&before, &slower, false), &config).unwrap().fail);
        // Improvements never fail the run
        assert!(!execute(&compare_cli(&before, &faster, true), &config).unwrap().fail);
    }
}
