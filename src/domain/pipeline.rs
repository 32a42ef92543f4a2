//! Load → merge → classify → persist.
//!
//! `PipelineConfig` carries the file locations, thresholds and per-field
//! parsing modes of one run.

use crate::domain::classify::{SentimentClass, Thresholds};
use crate::domain::error::FearGreedError;
use crate::domain::merge::{hourly_sentiment, merge_trades};
use crate::domain::sentiment::LabelPolicy;
use crate::domain::trade::FieldMode;
use crate::ports::data_port::RecordSource;
use crate::ports::output_port::MergedSink;
use std::path::PathBuf;

pub const DEFAULT_SENTIMENT_PATH: &str = "data/fear_greed_index.csv";
pub const DEFAULT_TRADES_PATH: &str = "data/historical_data.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "data/merged_data.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsingConfig {
    pub closed_pnl: FieldMode,
    pub unknown_label: LabelPolicy,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            closed_pnl: FieldMode::Coerce,
            unknown_label: LabelPolicy::Null,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sentiment_path: PathBuf,
    pub trades_path: PathBuf,
    pub output_path: PathBuf,
    pub thresholds: Thresholds,
    pub parsing: ParsingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sentiment_path: PathBuf::from(DEFAULT_SENTIMENT_PATH),
            trades_path: PathBuf::from(DEFAULT_TRADES_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            thresholds: Thresholds::default(),
            parsing: ParsingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub sentiment_rows: usize,
    pub buckets: usize,
    pub trades: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub null_pnl: usize,
    /// Row count per class, in `SentimentClass::ALL` order, zero counts omitted.
    pub by_class: Vec<(SentimentClass, usize)>,
}

/// Runs one pipeline pass. Any stage failure aborts before the sink is
/// touched.
pub fn run_pipeline(
    source: &dyn RecordSource,
    sink: &dyn MergedSink,
    thresholds: &Thresholds,
) -> Result<PipelineReport, FearGreedError> {
    let sentiment = source.load_sentiment()?;
    let sentiment_rows = sentiment.len();
    tracing::info!(rows = sentiment_rows, "loaded sentiment");

    let hourly = hourly_sentiment(sentiment, &source.sentiment_origin())?;
    tracing::info!(
        buckets = hourly.bucket_count(),
        first = %hourly.first_bucket(),
        last = %hourly.last_bucket(),
        "resampled sentiment to hourly buckets"
    );

    let trades = source.load_trades()?;
    let trade_count = trades.len();
    tracing::info!(rows = trade_count, "loaded trades");

    let merged = merge_trades(trades, &hourly, thresholds);
    debug_assert_eq!(merged.len(), trade_count);

    let matched = merged.iter().filter(|m| m.sentiment_score.is_some()).count();
    let null_pnl = merged.iter().filter(|m| m.trade.closed_pnl.is_none()).count();
    let by_class = SentimentClass::ALL
        .iter()
        .map(|class| {
            let n = merged.iter().filter(|m| m.classification == *class).count();
            (*class, n)
        })
        .filter(|(_, n)| *n > 0)
        .collect();

    if matched < trade_count {
        tracing::warn!(
            unmatched = trade_count - matched,
            "trades fall outside the sentiment range and carry no score"
        );
    }

    sink.write(&merged)?;
    tracing::info!(rows = merged.len(), "wrote merged records");

    Ok(PipelineReport {
        sentiment_rows,
        buckets: hourly.bucket_count(),
        trades: trade_count,
        matched,
        unmatched: trade_count - matched,
        null_pnl,
        by_class,
    })
}
