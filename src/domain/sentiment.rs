//! Daily fear & greed sentiment observations.

use chrono::{DateTime, NaiveDateTime};
use std::fmt;

/// Binary fear / greed label carried by the source index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FearGreedLabel {
    Fear = 0,
    Greed = 1,
}

impl FearGreedLabel {
    pub fn from_classification(s: &str) -> Option<Self> {
        match s.trim() {
            "Fear" => Some(FearGreedLabel::Fear),
            "Greed" => Some(FearGreedLabel::Greed),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" | "0.0" => Some(FearGreedLabel::Fear),
            "1" | "1.0" => Some(FearGreedLabel::Greed),
            _ => None,
        }
    }
}

impl fmt::Display for FearGreedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What to do with a classification that is neither `Fear` nor `Greed`
/// (e.g. `Extreme Fear`, `Neutral`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// Keep the row with no label.
    #[default]
    Null,
    /// Fail the load.
    Reject,
}

impl LabelPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "null" => Some(LabelPolicy::Null),
            "reject" => Some(LabelPolicy::Reject),
            _ => None,
        }
    }

    pub fn resolve(&self, classification: &str) -> Result<Option<FearGreedLabel>, String> {
        match (FearGreedLabel::from_classification(classification), self) {
            (Some(label), _) => Ok(Some(label)),
            (None, LabelPolicy::Null) => Ok(None),
            (None, LabelPolicy::Reject) => Err(format!(
                "unrecognised classification {classification:?} (expected Fear or Greed)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentRecord {
    pub timestamp: NaiveDateTime,
    pub sentiment_score: f64,
    pub label: Option<FearGreedLabel>,
}

/// Unix seconds to a UTC wall-clock timestamp; `None` if out of range.
pub fn epoch_to_datetime(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn epoch_seconds_convert_to_utc() {
        let dt = epoch_to_datetime(1_704_067_200).unwrap();
        assert_eq!(
            dt,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn epoch_out_of_range_is_none() {
        assert!(epoch_to_datetime(i64::MAX).is_none());
    }

    #[test]
    fn fear_and_greed_map_to_binary_labels() {
        assert_eq!(
            LabelPolicy::Null.resolve("Fear").unwrap(),
            Some(FearGreedLabel::Fear)
        );
        assert_eq!(
            LabelPolicy::Reject.resolve("Greed").unwrap(),
            Some(FearGreedLabel::Greed)
        );
        assert_eq!(FearGreedLabel::Fear.code(), 0);
        assert_eq!(FearGreedLabel::Greed.to_string(), "1");
    }

    #[test]
    fn other_labels_follow_policy() {
        assert_eq!(LabelPolicy::Null.resolve("Extreme Fear").unwrap(), None);
        let err = LabelPolicy::Reject.resolve("Neutral").unwrap_err();
        assert!(err.contains("Neutral"));
    }

    #[test]
    fn label_policy_parses_case_insensitively() {
        assert_eq!(LabelPolicy::parse("NULL"), Some(LabelPolicy::Null));
        assert_eq!(LabelPolicy::parse(" reject "), Some(LabelPolicy::Reject));
        assert_eq!(LabelPolicy::parse("drop"), None);
    }

    #[test]
    fn label_codes_parse_back() {
        assert_eq!(FearGreedLabel::from_code("0"), Some(FearGreedLabel::Fear));
        assert_eq!(FearGreedLabel::from_code("1.0"), Some(FearGreedLabel::Greed));
        assert_eq!(FearGreedLabel::from_code(""), None);
    }
}
