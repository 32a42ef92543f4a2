//! Domain error types.

/// Top-level error type for feargreed.
#[derive(Debug, thiserror::Error)]
pub enum FearGreedError {
    #[error("input file not found: {path}")]
    MissingInput { path: String },

    #[error("parse error in {file} line {line}, column {column}: {reason}")]
    Parse {
        file: String,
        line: u64,
        column: String,
        reason: String,
    },

    #[error("missing column {column:?} in {file}")]
    Schema { file: String, column: String },

    #[error("csv error in {file}: {reason}")]
    Csv { file: String, reason: String },

    #[error("no sentiment observations in {file}")]
    EmptySentiment { file: String },

    #[error("malformed trade at line {line}: {reason}")]
    MalformedTrade { line: u64, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FearGreedError> for std::process::ExitCode {
    fn from(err: &FearGreedError) -> Self {
        let code: u8 = match err {
            FearGreedError::Io(_) | FearGreedError::Csv { .. } => 1,
            FearGreedError::ConfigParse { .. } | FearGreedError::ConfigInvalid { .. } => 2,
            FearGreedError::MissingInput { .. } => 3,
            FearGreedError::Parse { .. } | FearGreedError::Schema { .. } => 4,
            FearGreedError::EmptySentiment { .. } | FearGreedError::MalformedTrade { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
