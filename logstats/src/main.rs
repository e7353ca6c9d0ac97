//! # logstats
//!
//! A CLI tool that analyzes nginx combined-format access logs and renders a
//! statistics report.
//!
//! ## Usage
//!
//! ```bash
//! # Analyze a single file
//! logstats --path logs/access.log
//!
//! # Analyze everything a glob matches, bounded to a date range
//! logstats --path "logs/*.log" --from 2015-05-17 --to 2015-05-19
//!
//! # Fetch the log over HTTP and emit AsciiDoc
//! logstats --path https://example.com/access.log --format adoc
//!
//! # Only count requests from a matching user agent
//! logstats --path logs/access.log --filter-field agent --filter-value "Mozilla*"
//! ```
//!
//! The report is printed to stdout and written to `statistics.md` /
//! `statistics.adoc` (or `--output`). Per-line rejections are reported on
//! stderr as warnings; they never fail the run. A report with zero counts
//! means no line survived parsing and filtering.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use logstatslib::{
    analyze_source, find_log_files, parse_date_bound, render_report, save_report, AnalyzerConfig,
    LogSource, ReportFormat,
};

#[derive(Parser, Debug)]
#[command(
    name = "logstats",
    version,
    about = "Analyze nginx access logs and render a Markdown or AsciiDoc statistics report"
)]
struct Cli {
    /// Log files to analyze: a path, a glob pattern, or an http(s) URL
    #[arg(long)]
    path: String,

    /// Start date, inclusive (yyyy-mm-dd or yyyy-mm-ddThh:mm:ss)
    #[arg(long)]
    from: Option<String>,

    /// End date, inclusive (yyyy-mm-dd or yyyy-mm-ddThh:mm:ss)
    #[arg(long)]
    to: Option<String>,

    /// Report format
    #[arg(long, default_value = "markdown", value_parser = ["markdown", "adoc"])]
    format: String,

    /// Field to filter entries by (agent, status, resource, method, ip)
    #[arg(long)]
    filter_field: Option<String>,

    /// Glob-like value the filter field must match (e.g. "Mozilla*")
    #[arg(long)]
    filter_value: Option<String>,

    /// Report file location (defaults to statistics.md / statistics.adoc)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let source = match &config.url {
        Some(url) => LogSource::Url(url.clone()),
        None => LogSource::Files(config.files.clone()),
    };

    let stats = analyze_source(&source, &config)?;
    let lines = render_report(&config, &stats);

    for line in &lines {
        println!("{line}");
    }

    let output = cli.output.clone().unwrap_or_else(|| config.output_path());
    save_report(&output, &lines)
        .with_context(|| format!("could not save the report to {}", output.display()))?;

    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<AnalyzerConfig> {
    let from = cli
        .from
        .as_deref()
        .map(parse_date_bound)
        .transpose()
        .context("invalid --from bound")?;
    let to = cli
        .to
        .as_deref()
        .map(parse_date_bound)
        .transpose()
        .context("invalid --to bound")?;

    let format: ReportFormat = cli
        .format
        .parse()
        .map_err(|message: String| anyhow::anyhow!(message))?;

    let (files, url) = if is_url(&cli.path) {
        (Vec::new(), Some(cli.path.clone()))
    } else {
        (find_log_files(&cli.path)?, None)
    };

    // Filtering is armed only when both halves are present
    let (filter_field, filter_value) = match (&cli.filter_field, &cli.filter_value) {
        (Some(field), Some(value)) => (Some(field.clone()), Some(value.clone())),
        _ => (None, None),
    };

    Ok(AnalyzerConfig {
        from,
        to,
        format,
        files,
        url,
        filter_field,
        filter_value,
    })
}

fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
