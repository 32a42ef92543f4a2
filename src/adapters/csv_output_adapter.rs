//! CSV writer for the merged table.

use crate::domain::error::FearGreedError;
use crate::domain::merge::MergedRecord;
use crate::ports::output_port::MergedSink;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const MERGED_COLUMNS: [&str; 11] = [
    "Account",
    "Coin",
    "Execution Price",
    "Size USD",
    "Side",
    "datetime",
    "Closed PnL",
    "Leverage",
    "sentiment_score",
    "label",
    "classification",
];

pub const MERGED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvMergedWriter {
    path: PathBuf,
}

impl CsvMergedWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_error(&self, e: csv::Error) -> FearGreedError {
        FearGreedError::Csv {
            file: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Sibling of `path` that output is staged in before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes through `fill` into a staging file and renames it over `path` once
/// every row is flushed. On any failure the staging file is removed and
/// `path` keeps its previous contents.
fn replace_file(
    path: &Path,
    fill: impl FnOnce(&mut csv::Writer<File>) -> Result<(), FearGreedError>,
) -> Result<(), FearGreedError> {
    let staging = staging_path(path);
    let result = File::create(&staging)
        .map_err(FearGreedError::from)
        .and_then(|file| {
            let mut wtr = csv::Writer::from_writer(file);
            fill(&mut wtr)?;
            wtr.flush()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&staging, path).map_err(FearGreedError::from));

    if result.is_err() && staging.is_file() {
        let _ = fs::remove_file(&staging);
    }
    result
}

impl MergedSink for CsvMergedWriter {
    fn write(&self, records: &[MergedRecord]) -> Result<(), FearGreedError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        replace_file(&self.path, |wtr| {
            wtr.write_record(MERGED_COLUMNS)
                .map_err(|e| self.csv_error(e))?;

            for r in records {
                let t = &r.trade;
                wtr.write_record([
                    t.account.clone(),
                    t.coin.clone(),
                    t.execution_price.to_string(),
                    t.size_usd.to_string(),
                    t.side.to_string(),
                    t.timestamp.format(MERGED_DATETIME_FORMAT).to_string(),
                    optional(t.closed_pnl),
                    t.leverage.to_string(),
                    optional(r.sentiment_score),
                    optional(r.label),
                    r.classification.to_string(),
                ])
                .map_err(|e| self.csv_error(e))?;
            }
            Ok(())
        })?;

        tracing::debug!(path = %self.path.display(), rows = records.len(), "merged table replaced");
        Ok(())
    }
}
