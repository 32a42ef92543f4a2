//! Input port: where sentiment and trade records come from.

use crate::domain::error::FearGreedError;
use crate::domain::sentiment::SentimentRecord;
use crate::domain::trade::TradeRecord;

pub trait RecordSource {
    fn load_sentiment(&self) -> Result<Vec<SentimentRecord>, FearGreedError>;

    fn load_trades(&self) -> Result<Vec<TradeRecord>, FearGreedError>;

    /// Human-readable name of the sentiment source, used in diagnostics.
    fn sentiment_origin(&self) -> String;
}
