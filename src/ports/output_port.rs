//! Output port for the merged table.

use crate::domain::error::FearGreedError;
use crate::domain::merge::MergedRecord;

pub trait MergedSink {
    fn write(&self, records: &[MergedRecord]) -> Result<(), FearGreedError>;
}
