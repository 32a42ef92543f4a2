//! Trade execution records and per-field parsing modes.

use crate::domain::error::FearGreedError;
use chrono::NaiveDateTime;
use std::fmt;

/// Format of the `Timestamp IST` column, e.g. `05-01-2024 14:30`.
pub const TRADE_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// How a field reacts to a value it cannot parse.
///
/// `Strict` aborts the load. `Coerce` turns blank, unparseable or non-finite
/// input into a null and keeps the row. Trade timestamps and prices are always strict;
/// `Closed PnL` defaults to coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Strict,
    Coerce,
}

impl FieldMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Some(FieldMode::Strict),
            "coerce" => Some(FieldMode::Coerce),
            _ => None,
        }
    }

    pub fn parse_f64(&self, raw: &str) -> Result<Option<f64>, String> {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ if *self == FieldMode::Coerce => Ok(None),
            _ if trimmed.is_empty() => Err("value is blank".to_string()),
            Ok(_) => Err(format!("{trimmed:?} is not a finite number")),
            Err(_) => Err(format!("{trimmed:?} is not a number")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub account: String,
    pub coin: String,
    pub execution_price: f64,
    pub size_usd: f64,
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub closed_pnl: Option<f64>,
    pub leverage: f64,
}

impl TradeRecord {
    /// Builds a record and derives `leverage = size_usd / execution_price`.
    ///
    /// A zero, negative or non-finite price is rejected, as is any size or
    /// leverage that is not finite; `line` is only used for the error message.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        line: u64,
        account: String,
        coin: String,
        execution_price: f64,
        size_usd: f64,
        side: Side,
        timestamp: NaiveDateTime,
        closed_pnl: Option<f64>,
    ) -> Result<Self, FearGreedError> {
        if !execution_price.is_finite() || execution_price <= 0.0 {
            return Err(FearGreedError::MalformedTrade {
                line,
                reason: format!("execution price must be positive, got {execution_price}"),
            });
        }
        if !size_usd.is_finite() {
            return Err(FearGreedError::MalformedTrade {
                line,
                reason: format!("size must be finite, got {size_usd}"),
            });
        }
        let leverage = size_usd / execution_price;
        if !leverage.is_finite() {
            return Err(FearGreedError::MalformedTrade {
                line,
                reason: format!("leverage {size_usd} / {execution_price} overflows"),
            });
        }
        Ok(Self {
            account,
            coin,
            execution_price,
            size_usd,
            side,
            timestamp,
            closed_pnl,
            leverage,
        })
    }
}

pub fn parse_trade_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), TRADE_TIMESTAMP_FORMAT).map_err(|e| {
        format!("{raw:?} does not match {TRADE_TIMESTAMP_FORMAT}: {e}")
    })
}
