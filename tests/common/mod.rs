#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use feargreed::domain::error::FearGreedError;
use feargreed::domain::merge::MergedRecord;
use feargreed::domain::sentiment::{FearGreedLabel, SentimentRecord};
use feargreed::domain::trade::{Side, TradeRecord};
use feargreed::ports::data_port::RecordSource;
use feargreed::ports::output_port::MergedSink;
use std::cell::RefCell;

pub struct MockSource {
    pub sentiment: Vec<SentimentRecord>,
    pub trades: Vec<TradeRecord>,
    pub sentiment_error: Option<String>,
    pub trades_error: Option<String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            sentiment: Vec::new(),
            trades: Vec::new(),
            sentiment_error: None,
            trades_error: None,
        }
    }

    pub fn with_sentiment(mut self, records: Vec<SentimentRecord>) -> Self {
        self.sentiment = records;
        self
    }

    pub fn with_trades(mut self, trades: Vec<TradeRecord>) -> Self {
        self.trades = trades;
        self
    }

    pub fn with_missing_trades(mut self, path: &str) -> Self {
        self.trades_error = Some(path.to_string());
        self
    }
}

impl RecordSource for MockSource {
    fn load_sentiment(&self) -> Result<Vec<SentimentRecord>, FearGreedError> {
        if let Some(path) = &self.sentiment_error {
            return Err(FearGreedError::MissingInput { path: path.clone() });
        }
        Ok(self.sentiment.clone())
    }

    fn load_trades(&self) -> Result<Vec<TradeRecord>, FearGreedError> {
        if let Some(path) = &self.trades_error {
            return Err(FearGreedError::MissingInput { path: path.clone() });
        }
        Ok(self.trades.clone())
    }

    fn sentiment_origin(&self) -> String {
        "mock".to_string()
    }
}

#[derive(Default)]
pub struct MemorySink {
    pub written: RefCell<Option<Vec<MergedRecord>>>,
}

impl MemorySink {
    pub fn rows(&self) -> Vec<MergedRecord> {
        self.written.borrow().clone().unwrap_or_default()
    }

    pub fn was_written(&self) -> bool {
        self.written.borrow().is_some()
    }
}

impl MergedSink for MemorySink {
    fn write(&self, records: &[MergedRecord]) -> Result<(), FearGreedError> {
        *self.written.borrow_mut() = Some(records.to_vec());
        Ok(())
    }
}

/// `"2024-01-01 00:45"` style timestamps.
pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn sentiment(ts: &str, score: f64) -> SentimentRecord {
    SentimentRecord {
        timestamp: dt(ts),
        sentiment_score: score,
        label: Some(if score >= 50.0 {
            FearGreedLabel::Greed
        } else {
            FearGreedLabel::Fear
        }),
    }
}

pub fn trade(ts: &str, price: f64, size: f64) -> TradeRecord {
    TradeRecord::new(
        1,
        "0xabc".to_string(),
        "BTC".to_string(),
        price,
        size,
        Side::Buy,
        dt(ts),
        Some(1.0),
    )
    .unwrap()
}

pub fn trade_with_pnl(ts: &str, pnl: Option<f64>) -> TradeRecord {
    TradeRecord {
        closed_pnl: pnl,
        ..trade(ts, 100.0, 500.0)
    }
}

pub const SENTIMENT_CSV: &str = "timestamp,value,classification,date\n\
1704067200,55,Greed,2024-01-01\n\
1704153600,30,Fear,2024-01-02\n\
1704240000,72,Extreme Greed,2024-01-03\n";

pub const TRADES_CSV: &str = "Account,Coin,Execution Price,Size USD,Side,Timestamp IST,Closed PnL\n\
0xaaa,BTC,100,500,BUY,01-01-2024 00:45,0\n\
0xaaa,BTC,200,300,SELL,01-01-2024 23:59,25.5\n\
0xbbb,ETH,50,100,BUY,02-01-2024 10:10,\n\
0xbbb,ETH,40,80,SELL,03-01-2024 00:05,-4\n\
0xccc,SOL,10,20,BUY,03-01-2024 01:00,n/a\n\
0xccc,SOL,10,20,BUY,31-12-2023 23:30,3\n";
