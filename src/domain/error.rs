//! Domain error types.
//!
//! Every failure is terminal for the current run: the core never substitutes
//! defaults for malformed input, so the caller can decide whether to skip the
//! symbol, retry with adjusted dates, or abort.

/// Top-level error type for swingtrader.
#[derive(Debug, thiserror::Error)]
pub enum SwingtraderError {
    #[error("invalid bar on {date}: {reason}")]
    InvalidBar { date: String, reason: String },

    #[error("insufficient history: have {bars} bars, need {minimum} for indicator warm-up")]
    InsufficientHistory { bars: usize, minimum: usize },

    #[error("empty bar series")]
    EmptySeries,

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("fetch failed for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SwingtraderError> for std::process::ExitCode {
    fn from(err: &SwingtraderError) -> Self {
        let code: u8 = match err {
            SwingtraderError::Io(_) => 1,
            SwingtraderError::ConfigParse { .. }
            | SwingtraderError::ConfigMissing { .. }
            | SwingtraderError::ConfigInvalid { .. }
            | SwingtraderError::InvalidConfiguration { .. } => 2,
            SwingtraderError::Fetch { .. } => 3,
            SwingtraderError::InvalidBar { .. } => 4,
            SwingtraderError::EmptySeries | SwingtraderError::InsufficientHistory { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
