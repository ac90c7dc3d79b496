//! Domain error types.
//!
//! Insufficient history is deliberately NOT an error: signal and metric code
//! degrades to "no signal" / zero instead. Only faults that must halt a run
//! (bad config, unreadable data, a missing price mid-simulation) live here.

use chrono::NaiveDate;

/// Top-level error type for etfrotor.
#[derive(Debug, thiserror::Error)]
pub enum EtfRotorError {
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

    #[error("price data error in {source_name}: {reason}")]
    PriceData { source_name: String, reason: String },

    #[error(transparent)]
    Universe(#[from] crate::domain::universe::UniverseError),

    #[error("no price for {symbol} on {date}")]
    MissingPrice { symbol: String, date: NaiveDate },

    #[error("insufficient data: have {rows} rows, need {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EtfRotorError> for std::process::ExitCode {
    fn from(err: &EtfRotorError) -> Self {
        let code: u8 = match err {
            EtfRotorError::Io(_) => 1,
            EtfRotorError::ConfigParse { .. }
            | EtfRotorError::ConfigMissing { .. }
            | EtfRotorError::ConfigInvalid { .. } => 2,
            EtfRotorError::PriceData { .. } => 3,
            EtfRotorError::Universe(_) => 4,
            EtfRotorError::MissingPrice { .. } | EtfRotorError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
