//! CSV file data adapter.
//!
//! Reads the sentiment index and trade log (`CsvSource`) and reads back a
//! merged table written by `CsvMergedWriter` (`CsvMergedReader`).

use crate::adapters::csv_output_adapter::{MERGED_COLUMNS, MERGED_DATETIME_FORMAT};
use crate::domain::classify::SentimentClass;
use crate::domain::error::FearGreedError;
use crate::domain::merge::MergedRecord;
use crate::domain::pipeline::ParsingConfig;
use crate::domain::sentiment::{FearGreedLabel, SentimentRecord, epoch_to_datetime};
use crate::domain::trade::{FieldMode, Side, TradeRecord, parse_trade_timestamp};
use crate::ports::data_port::RecordSource;
use chrono::NaiveDateTime;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const SENTIMENT_COLUMNS: [&str; 3] = ["timestamp", "value", "classification"];
pub const TRADE_COLUMNS: [&str; 7] = [
    "Account",
    "Coin",
    "Execution Price",
    "Size USD",
    "Side",
    "Timestamp IST",
    "Closed PnL",
];

pub struct CsvSource {
    sentiment_path: PathBuf,
    trades_path: PathBuf,
    parsing: ParsingConfig,
}

impl CsvSource {
    pub fn new(sentiment_path: PathBuf, trades_path: PathBuf, parsing: ParsingConfig) -> Self {
        Self {
            sentiment_path,
            trades_path,
            parsing,
        }
    }
}

impl RecordSource for CsvSource {
    fn load_sentiment(&self) -> Result<Vec<SentimentRecord>, FearGreedError> {
        let mut table = Table::open(&self.sentiment_path, &SENTIMENT_COLUMNS)?;
        let mut records = Vec::new();
        let mut unlabelled = 0usize;

        for row in table.rows() {
            let row = row?;
            let secs: i64 = row.strict("timestamp", |s| {
                s.parse::<i64>()
                    .map_err(|_| format!("{s:?} is not an integer epoch timestamp"))
            })?;
            let timestamp = epoch_to_datetime(secs)
                .ok_or_else(|| row.error("timestamp", format!("{secs} is out of range")))?;
            let sentiment_score = row.number("value", FieldMode::Strict)?.unwrap_or_default();
            let raw_label = row.field("classification");
            let label = self
                .parsing
                .unknown_label
                .resolve(raw_label)
                .map_err(|reason| row.error("classification", reason))?;

            if label.is_none() {
                unlabelled += 1;
                tracing::debug!(line = row.line, classification = raw_label, "no binary label");
            }

            records.push(SentimentRecord {
                timestamp,
                sentiment_score,
                label,
            });
        }

        if unlabelled > 0 {
            tracing::info!(
                rows = unlabelled,
                "sentiment rows outside Fear/Greed carry a null label"
            );
        }
        Ok(records)
    }

    fn load_trades(&self) -> Result<Vec<TradeRecord>, FearGreedError> {
        let mut table = Table::open(&self.trades_path, &TRADE_COLUMNS)?;
        let mut trades = Vec::new();
        let mut coerced = 0usize;

        for row in table.rows() {
            let row = row?;
            let timestamp = row.strict("Timestamp IST", parse_trade_timestamp)?;
            let side = row.strict("Side", |s| {
                Side::parse(s).ok_or_else(|| format!("{s:?} is not BUY or SELL"))
            })?;
            let execution_price = row
                .number("Execution Price", FieldMode::Strict)?
                .unwrap_or_default();
            let size_usd = row.number("Size USD", FieldMode::Strict)?.unwrap_or_default();
            let closed_pnl = row.number("Closed PnL", self.parsing.closed_pnl)?;

            if closed_pnl.is_none() {
                coerced += 1;
                tracing::debug!(line = row.line, raw = row.field("Closed PnL"), "closed PnL coerced to null");
            }

            trades.push(TradeRecord::new(
                row.line,
                row.field("Account").to_string(),
                row.field("Coin").to_string(),
                execution_price,
                size_usd,
                side,
                timestamp,
                closed_pnl,
            )?);
        }

        if coerced > 0 {
            tracing::info!(rows = coerced, "trades with unparseable closed PnL kept as null");
        }
        Ok(trades)
    }

    fn sentiment_origin(&self) -> String {
        self.sentiment_path.display().to_string()
    }
}

/// Reads a merged table back into memory.
pub struct CsvMergedReader {
    path: PathBuf,
}

impl CsvMergedReader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn read(&self) -> Result<Vec<MergedRecord>, FearGreedError> {
        let mut table = Table::open(&self.path, &MERGED_COLUMNS)?;
        let mut records = Vec::new();

        for row in table.rows() {
            let row = row?;
            let timestamp = row.strict("datetime", |s| {
                NaiveDateTime::parse_from_str(s, MERGED_DATETIME_FORMAT)
                    .map_err(|e| format!("{s:?} is not {MERGED_DATETIME_FORMAT}: {e}"))
            })?;
            let side = row.strict("Side", |s| {
                Side::parse(s).ok_or_else(|| format!("{s:?} is not BUY or SELL"))
            })?;
            let label = match row.field("label").trim() {
                "" => None,
                code => Some(FearGreedLabel::from_code(code).ok_or_else(|| {
                    row.error("label", format!("{code:?} is not 0 or 1"))
                })?),
            };
            let classification = row.strict("classification", |s| {
                SentimentClass::parse(s).ok_or_else(|| format!("{s:?} is not a sentiment class"))
            })?;

            let trade = TradeRecord {
                account: row.field("Account").to_string(),
                coin: row.field("Coin").to_string(),
                execution_price: row
                    .number("Execution Price", FieldMode::Strict)?
                    .unwrap_or_default(),
                size_usd: row.number("Size USD", FieldMode::Strict)?.unwrap_or_default(),
                side,
                timestamp,
                closed_pnl: row.nullable_number("Closed PnL")?,
                leverage: row.number("Leverage", FieldMode::Strict)?.unwrap_or_default(),
            };

            records.push(MergedRecord {
                trade,
                sentiment_score: row.nullable_number("sentiment_score")?,
                label,
                classification,
            });
        }

        Ok(records)
    }
}

/// A delimited file with its required columns resolved to indices.
struct Table {
    file: String,
    columns: Vec<(&'static str, usize)>,
    reader: csv::Reader<std::io::Cursor<Vec<u8>>>,
}

impl Table {
    fn open(path: &Path, required: &[&'static str]) -> Result<Self, FearGreedError> {
        let file = path.display().to_string();
        let content = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FearGreedError::MissingInput { path: file.clone() },
            _ => FearGreedError::Io(e),
        })?;

        let mut reader = csv::Reader::from_reader(std::io::Cursor::new(content));
        let headers = reader
            .headers()
            .map_err(|e| FearGreedError::Csv {
                file: file.clone(),
                reason: e.to_string(),
            })?
            .clone();

        let mut columns = Vec::with_capacity(required.len());
        for name in required {
            let idx = headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| FearGreedError::Schema {
                    file: file.clone(),
                    column: name.to_string(),
                })?;
            columns.push((*name, idx));
        }

        Ok(Self {
            file,
            columns,
            reader,
        })
    }

    /// Rows borrow the file name and column map from the table.
    fn rows(&mut self) -> impl Iterator<Item = Result<Row<'_>, FearGreedError>> {
        let Table {
            file,
            columns,
            reader,
        } = self;
        let file: &str = file;
        let columns: &[(&'static str, usize)] = columns;
        reader.records().map(move |result| match result {
            Ok(record) => Ok(Row {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                file,
                columns,
                record,
            }),
            Err(e) => Err(FearGreedError::Csv {
                file: file.to_string(),
                reason: e.to_string(),
            }),
        })
    }
}

struct Row<'a> {
    line: u64,
    file: &'a str,
    columns: &'a [(&'static str, usize)],
    record: csv::StringRecord,
}

impl Row<'_> {
    fn field(&self, name: &str) -> &str {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, idx)| self.record.get(*idx))
            .unwrap_or("")
    }

    fn error(&self, column: &str, reason: String) -> FearGreedError {
        FearGreedError::Parse {
            file: self.file.to_string(),
            line: self.line,
            column: column.to_string(),
            reason,
        }
    }

    fn strict<T>(
        &self,
        column: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, FearGreedError> {
        parse(self.field(column).trim()).map_err(|reason| self.error(column, reason))
    }

    /// Strict mode never yields `Ok(None)`.
    fn number(&self, column: &str, mode: FieldMode) -> Result<Option<f64>, FearGreedError> {
        mode.parse_f64(self.field(column))
            .map_err(|reason| self.error(column, reason))
    }

    /// Blank is null; anything else must be numeric.
    fn nullable_number(&self, column: &str) -> Result<Option<f64>, FearGreedError> {
        if self.field(column).trim().is_empty() {
            return Ok(None);
        }
        self.number(column, FieldMode::Strict)
    }
}
