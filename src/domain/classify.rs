//! Rule-based fear / neutral / greed classification of a sentiment score.

use crate::domain::error::FearGreedError;
use std::fmt;

pub const DEFAULT_FEAR_THRESHOLD: f64 = 40.0;
pub const DEFAULT_GREED_THRESHOLD: f64 = 60.0;

/// Ordinal sentiment category. `Unknown` marks a row with no score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SentimentClass {
    Fear,
    Neutral,
    Greed,
    Unknown,
}

impl SentimentClass {
    pub const ALL: [SentimentClass; 4] = [
        SentimentClass::Fear,
        SentimentClass::Neutral,
        SentimentClass::Greed,
        SentimentClass::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentClass::Fear => "Fear",
            SentimentClass::Neutral => "Neutral",
            SentimentClass::Greed => "Greed",
            SentimentClass::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Fear" => Some(SentimentClass::Fear),
            "Neutral" => Some(SentimentClass::Neutral),
            "Greed" => Some(SentimentClass::Greed),
            "Unknown" | "" => Some(SentimentClass::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification cut-offs: `score >= greed` is Greed, `score >= fear` is
/// Neutral, anything lower is Fear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub fear: f64,
    pub greed: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fear: DEFAULT_FEAR_THRESHOLD,
            greed: DEFAULT_GREED_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(fear: f64, greed: f64) -> Result<Self, FearGreedError> {
        if !fear.is_finite() || !greed.is_finite() {
            return Err(FearGreedError::ConfigInvalid {
                section: "classification".into(),
                key: if fear.is_finite() {
                    "greed_threshold".into()
                } else {
                    "fear_threshold".into()
                },
                reason: "thresholds must be finite numbers".into(),
            });
        }
        if fear >= greed {
            return Err(FearGreedError::ConfigInvalid {
                section: "classification".into(),
                key: "fear_threshold".into(),
                reason: format!("fear_threshold ({fear}) must be below greed_threshold ({greed})"),
            });
        }
        Ok(Self { fear, greed })
    }

    /// NaN is treated like a missing score.
    pub fn classify(&self, score: Option<f64>) -> SentimentClass {
        match score {
            Some(s) if s.is_nan() => SentimentClass::Unknown,
            Some(s) if s >= self.greed => SentimentClass::Greed,
            Some(s) if s >= self.fear => SentimentClass::Neutral,
            Some(_) => SentimentClass::Fear,
            None => SentimentClass::Unknown,
        }
    }
}

/// Classify with the default 40 / 60 cut-offs.
pub fn classify(score: Option<f64>) -> SentimentClass {
    Thresholds::default().classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(classify(Some(60.0)), SentimentClass::Greed);
        assert_eq!(classify(Some(59.9)), SentimentClass::Neutral);
        assert_eq!(classify(Some(40.0)), SentimentClass::Neutral);
        assert_eq!(classify(Some(39.9)), SentimentClass::Fear);
    }

    #[test]
    fn out_of_range_scores_still_classify() {
        assert_eq!(classify(Some(-5.0)), SentimentClass::Fear);
        assert_eq!(classify(Some(250.0)), SentimentClass::Greed);
    }

    #[test]
    fn missing_score_is_unknown() {
        assert_eq!(classify(None), SentimentClass::Unknown);
        assert_eq!(classify(Some(f64::NAN)), SentimentClass::Unknown);
    }

    #[test]
    fn custom_thresholds() {
        let t = Thresholds::new(25.0, 75.0).unwrap();
        assert_eq!(t.classify(Some(30.0)), SentimentClass::Neutral);
        assert_eq!(t.classify(Some(24.0)), SentimentClass::Fear);
        assert_eq!(t.classify(Some(75.0)), SentimentClass::Greed);
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let err = Thresholds::new(60.0, 40.0).unwrap_err();
        assert!(matches!(err, FearGreedError::ConfigInvalid { key, .. } if key == "fear_threshold"));
        assert!(Thresholds::new(50.0, 50.0).is_err());
    }

    #[test]
    fn thresholds_must_be_finite() {
        let err = Thresholds::new(40.0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, FearGreedError::ConfigInvalid { key, .. } if key == "greed_threshold"));
    }

    #[test]
    fn class_names_round_trip_through_parse() {
        for class in SentimentClass::ALL {
            assert_eq!(SentimentClass::parse(class.as_str()), Some(class));
        }
        assert_eq!(SentimentClass::parse("Extreme Fear"), None);
    }

    proptest! {
        #[test]
        fn classification_is_total_and_monotone(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let c_lo = classify(Some(lo));
            let c_hi = classify(Some(hi));
            prop_assert_ne!(c_lo, SentimentClass::Unknown);
            prop_assert!(c_lo <= c_hi);
        }
    }
}
