//! Configuration validation.
//!
//! Every key is optional; a key that is present must hold a usable value.

use crate::domain::classify::{DEFAULT_FEAR_THRESHOLD, DEFAULT_GREED_THRESHOLD, Thresholds};
use crate::domain::error::FearGreedError;
use crate::domain::sentiment::LabelPolicy;
use crate::domain::trade::FieldMode;
use crate::ports::config_port::ConfigPort;

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), FearGreedError> {
    validate_paths(config)?;
    validate_thresholds(config)?;
    validate_parsing(config)?;
    Ok(())
}

fn validate_paths(config: &dyn ConfigPort) -> Result<(), FearGreedError> {
    for (section, key) in [
        ("input", "sentiment_path"),
        ("input", "trades_path"),
        ("output", "merged_path"),
    ] {
        if let Some(value) = config.get_string(section, key)
            && value.trim().is_empty()
        {
            return Err(FearGreedError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{key} must not be empty"),
            });
        }
    }
    Ok(())
}

fn validate_thresholds(config: &dyn ConfigPort) -> Result<(), FearGreedError> {
    let fear = parse_threshold(config, "fear_threshold", DEFAULT_FEAR_THRESHOLD)?;
    let greed = parse_threshold(config, "greed_threshold", DEFAULT_GREED_THRESHOLD)?;
    Thresholds::new(fear, greed)?;
    Ok(())
}

fn parse_threshold(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, FearGreedError> {
    match config.get_string("classification", key) {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FearGreedError::ConfigInvalid {
                section: "classification".to_string(),
                key: key.to_string(),
                reason: format!("{s:?} is not a finite number"),
            }),
    }
}

fn validate_parsing(config: &dyn ConfigPort) -> Result<(), FearGreedError> {
    if let Some(s) = config.get_string("parsing", "closed_pnl")
        && FieldMode::parse(&s).is_none()
    {
        return Err(FearGreedError::ConfigInvalid {
            section: "parsing".to_string(),
            key: "closed_pnl".to_string(),
            reason: format!("{s:?} must be coerce or strict"),
        });
    }
    if let Some(s) = config.get_string("parsing", "unknown_label")
        && LabelPolicy::parse(&s).is_none()
    {
        return Err(FearGreedError::ConfigInvalid {
            section: "parsing".to_string(),
            key: "unknown_label".to_string(),
            reason: format!("{s:?} must be null or reject"),
        });
    }
    Ok(())
}
