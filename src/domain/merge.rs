//! Hourly forward-filled sentiment and the trade / sentiment left join.

use crate::domain::classify::{SentimentClass, Thresholds};
use crate::domain::error::FearGreedError;
use crate::domain::sentiment::{FearGreedLabel, SentimentRecord};
use crate::domain::trade::TradeRecord;
use chrono::{NaiveDateTime, Timelike};

/// Truncate a timestamp to the start of its hour.
pub fn hour_floor(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_hms_opt(ts.hour(), 0, 0).unwrap_or(ts)
}

/// Sentiment viewed as an hourly series with forward fill.
///
/// Observations are kept sorted with unique timestamps (the later input row
/// wins on a tie). The series spans the buckets
/// `hour_floor(first)..=hour_floor(last)`; lookups outside that span are null.
#[derive(Debug, Clone)]
pub struct HourlySentiment {
    observations: Vec<SentimentRecord>,
    first_bucket: NaiveDateTime,
    last_bucket: NaiveDateTime,
}

impl HourlySentiment {
    pub fn new(mut records: Vec<SentimentRecord>) -> Option<Self> {
        records.sort_by_key(|r| r.timestamp);

        let mut observations: Vec<SentimentRecord> = Vec::with_capacity(records.len());
        for record in records {
            match observations.last_mut() {
                Some(last) if last.timestamp == record.timestamp => *last = record,
                _ => observations.push(record),
            }
        }

        let first_bucket = hour_floor(observations.first()?.timestamp);
        let last_bucket = hour_floor(observations.last()?.timestamp);
        Some(Self {
            observations,
            first_bucket,
            last_bucket,
        })
    }

    pub fn observations(&self) -> &[SentimentRecord] {
        &self.observations
    }

    pub fn first_bucket(&self) -> NaiveDateTime {
        self.first_bucket
    }

    pub fn last_bucket(&self) -> NaiveDateTime {
        self.last_bucket
    }

    /// Number of hourly buckets the resampled series spans.
    pub fn bucket_count(&self) -> usize {
        (self.last_bucket - self.first_bucket).num_hours() as usize + 1
    }

    /// Most recent observation at or before `bucket`.
    pub fn at(&self, bucket: NaiveDateTime) -> Option<&SentimentRecord> {
        if bucket < self.first_bucket || bucket > self.last_bucket {
            return None;
        }
        let idx = self
            .observations
            .partition_point(|obs| obs.timestamp <= bucket);
        idx.checked_sub(1).map(|i| &self.observations[i])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub trade: TradeRecord,
    pub sentiment_score: Option<f64>,
    pub label: Option<FearGreedLabel>,
    pub classification: SentimentClass,
}

/// Left-join trades onto hourly sentiment, classifying each row.
///
/// Output has exactly one row per trade, in input order.
pub fn merge_trades(
    trades: Vec<TradeRecord>,
    sentiment: &HourlySentiment,
    thresholds: &Thresholds,
) -> Vec<MergedRecord> {
    trades
        .into_iter()
        .map(|trade| {
            let matched = sentiment.at(hour_floor(trade.timestamp));
            let sentiment_score = matched.map(|s| s.sentiment_score);
            MergedRecord {
                sentiment_score,
                label: matched.and_then(|s| s.label),
                classification: thresholds.classify(sentiment_score),
                trade,
            }
        })
        .collect()
}

/// Build the hourly view, failing on an empty sentiment series.
pub fn hourly_sentiment(
    records: Vec<SentimentRecord>,
    source: &str,
) -> Result<HourlySentiment, FearGreedError> {
    HourlySentiment::new(records).ok_or_else(|| FearGreedError::EmptySentiment {
        file: source.to_string(),
    })
}
