//! Domain error types.

use chrono::NaiveDate;

/// Failures of a single statistics or selection computation.
///
/// These are scoped to one request: the caller decides how to present them
/// (an "N/A" cell, an empty chart) and carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    #[error("insufficient data: {rows} price rows")]
    InsufficientData { rows: usize },

    #[error("sharpe ratio undefined for {symbol}: annualized volatility is zero")]
    DivisionByZero { symbol: String },

    #[error("no price rows between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Top-level error type for etfstats.
#[derive(Debug, thiserror::Error)]
pub enum EtfStatsError {
    #[error(transparent)]
    Stats(#[from] StatsError),

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

    #[error("price source error: {reason}")]
    DataSource { reason: String },

    #[error("invalid price for {symbol} on {date}: {value}")]
    InvalidPrice {
        symbol: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("duplicate symbol in price table: {0}")]
    DuplicateSymbol(String),

    #[error("price table dates must be strictly increasing: {previous} then {next}")]
    UnorderedDates { previous: NaiveDate, next: NaiveDate },

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EtfStatsError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            EtfStatsError::Io(_) | EtfStatsError::Render { .. } => 1,
            EtfStatsError::ConfigParse { .. }
            | EtfStatsError::ConfigMissing { .. }
            | EtfStatsError::ConfigInvalid { .. } => 2,
            EtfStatsError::DataSource { .. }
            | EtfStatsError::InvalidPrice { .. }
            | EtfStatsError::DuplicateSymbol(_)
            | EtfStatsError::UnorderedDates { .. } => 3,
            EtfStatsError::Stats(StatsError::UnknownSymbol(_)) => 4,
            EtfStatsError::Stats(_) => 5,
        }
    }
}

impl From<&EtfStatsError> for std::process::ExitCode {
    fn from(err: &EtfStatsError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
