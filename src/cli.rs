//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvMergedReader, CsvSource};
use crate::adapters::csv_output_adapter::CsvMergedWriter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::classify::{DEFAULT_FEAR_THRESHOLD, DEFAULT_GREED_THRESHOLD, Thresholds};
use crate::domain::config_validation::validate_pipeline_config;
use crate::domain::error::FearGreedError;
use crate::domain::pipeline::{
    DEFAULT_OUTPUT_PATH, DEFAULT_SENTIMENT_PATH, DEFAULT_TRADES_PATH, ParsingConfig,
    PipelineConfig, PipelineReport, run_pipeline,
};
use crate::domain::sentiment::LabelPolicy;
use crate::domain::summary::{Summary, summarize};
use crate::domain::trade::FieldMode;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(
    name = "feargreed",
    about = "Merge the Bitcoin fear & greed index with trade history"
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. info, debug, feargreed=trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, merge, classify and write the merged table
    Merge {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        sentiment: Option<PathBuf>,
        #[arg(long)]
        trades: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print per-classification statistics of a merged table
    Summary {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Validate a pipeline configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Merge {
            config,
            sentiment,
            trades,
            output,
        } => run_merge(config.as_ref(), sentiment, trades, output),
        Command::Summary { config, input } => run_summary(config.as_ref(), input),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: FearGreedError) -> ExitCode {
    tracing::error!("{err}");
    (&err).into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, FearGreedError> {
    tracing::info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

/// Validates and converts a config into a `PipelineConfig`. Absent keys take
/// their defaults.
pub fn build_pipeline_config(adapter: &dyn ConfigPort) -> Result<PipelineConfig, FearGreedError> {
    validate_pipeline_config(adapter)?;

    let path = |section: &str, key: &str, default: &str| {
        PathBuf::from(
            adapter
                .get_string(section, key)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| default.to_string()),
        )
    };

    let thresholds = Thresholds::new(
        adapter.get_double("classification", "fear_threshold", DEFAULT_FEAR_THRESHOLD),
        adapter.get_double("classification", "greed_threshold", DEFAULT_GREED_THRESHOLD),
    )?;

    let defaults = ParsingConfig::default();
    let parsing = ParsingConfig {
        closed_pnl: adapter
            .get_string("parsing", "closed_pnl")
            .and_then(|s| FieldMode::parse(&s))
            .unwrap_or(defaults.closed_pnl),
        unknown_label: adapter
            .get_string("parsing", "unknown_label")
            .and_then(|s| LabelPolicy::parse(&s))
            .unwrap_or(defaults.unknown_label),
    };

    Ok(PipelineConfig {
        sentiment_path: path("input", "sentiment_path", DEFAULT_SENTIMENT_PATH),
        trades_path: path("input", "trades_path", DEFAULT_TRADES_PATH),
        output_path: path("output", "merged_path", DEFAULT_OUTPUT_PATH),
        thresholds,
        parsing,
    })
}

fn resolve_config(config_path: Option<&PathBuf>) -> Result<PipelineConfig, FearGreedError> {
    match config_path {
        Some(path) => {
            let adapter = load_config(path)?;
            build_pipeline_config(&adapter)
        }
        None => Ok(PipelineConfig::default()),
    }
}

/// Runs the pipeline against CSV files on disk.
pub fn merge(config: &PipelineConfig) -> Result<PipelineReport, FearGreedError> {
    tracing::info!(
        sentiment = %config.sentiment_path.display(),
        trades = %config.trades_path.display(),
        fear = config.thresholds.fear,
        greed = config.thresholds.greed,
        "starting merge"
    );
    let source = CsvSource::new(
        config.sentiment_path.clone(),
        config.trades_path.clone(),
        config.parsing,
    );
    let sink = CsvMergedWriter::new(config.output_path.clone());
    run_pipeline(&source, &sink, &config.thresholds)
}

fn run_merge(
    config_path: Option<&PathBuf>,
    sentiment: Option<PathBuf>,
    trades: Option<PathBuf>,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match resolve_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    if let Some(p) = sentiment {
        config.sentiment_path = p;
    }
    if let Some(p) = trades {
        config.trades_path = p;
    }
    if let Some(p) = output {
        config.output_path = p;
    }

    match merge(&config) {
        Ok(report) => {
            print!("{}", format_report(&report));
            println!("Merged data written to: {}", config.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_summary(config_path: Option<&PathBuf>, input: Option<PathBuf>) -> ExitCode {
    let config = match resolve_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    let path = input.unwrap_or(config.output_path);

    tracing::info!(path = %path.display(), "reading merged table");
    match CsvMergedReader::new(path).read() {
        Ok(records) => {
            print!("{}", format_summary(&summarize(&records)));
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path).and_then(|a| build_pipeline_config(&a)) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    println!("sentiment:  {}", config.sentiment_path.display());
    println!("trades:     {}", config.trades_path.display());
    println!("output:     {}", config.output_path.display());
    println!(
        "thresholds: fear < {} <= neutral < {} <= greed",
        config.thresholds.fear, config.thresholds.greed
    );
    println!(
        "parsing:    closed_pnl={:?} unknown_label={:?}",
        config.parsing.closed_pnl, config.parsing.unknown_label
    );
    println!("Configuration is valid.");
    ExitCode::SUCCESS
}

pub fn format_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Merged {} trades against {} sentiment rows ({} hourly buckets)",
        report.trades, report.sentiment_rows, report.buckets
    );
    let _ = writeln!(
        out,
        "  with sentiment: {}, without: {}, null PnL: {}",
        report.matched, report.unmatched, report.null_pnl
    );
    for (class, n) in &report.by_class {
        let _ = writeln!(out, "  {:<8} {}", class.as_str(), n);
    }
    out
}

fn opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

pub fn format_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Rows: {}  Accounts: {}  Dominant: {}",
        summary.rows,
        summary.accounts,
        summary.dominant.map(|c| c.as_str()).unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "\n{:<8} {:>7} {:>6} {:>6} {:>12} {:>10} {:>8} {:>10}",
        "class", "trades", "buys", "sells", "total_pnl", "mean_pnl", "win%", "leverage"
    );
    for cs in &summary.classes {
        let _ = writeln!(
            out,
            "{:<8} {:>7} {:>6} {:>6} {:>12.2} {:>10} {:>8} {:>10}",
            cs.class.as_str(),
            cs.trades,
            cs.buys,
            cs.sells,
            cs.total_pnl,
            opt(cs.mean_pnl, 2),
            opt(cs.win_rate.map(|w| w * 100.0), 1),
            opt(cs.mean_leverage, 4),
        );
    }

    let c = &summary.correlation;
    let _ = writeln!(out, "\nCorrelation over {} complete rows:", c.rows);
    let _ = writeln!(out, "  Closed PnL ~ Leverage:        {}", opt(c.pnl_leverage, 3));
    let _ = writeln!(out, "  Closed PnL ~ sentiment_score: {}", opt(c.pnl_sentiment, 3));
    let _ = writeln!(out, "  Leverage ~ sentiment_score:   {}", opt(c.leverage_sentiment, 3));
    out
}
