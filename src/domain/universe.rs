//! Symbol universe: parsing symbol lists and checking them against a price source.

use crate::domain::error::EtfStatsError;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

/// The sector, country, bond, gold and currency ETFs tracked by default.
pub const DEFAULT_SYMBOLS: [&str; 18] = [
    "SPY", "XLB", "XLE", "XLF", "XLI", "XLK", "XLP", "XLU", "XLV", "XLY", "XTN", "EWJ", "EWG",
    "EEM", "EWZ", "TLT", "GLD", "FXE",
];

/// A symbol needs two prices to produce a return.
pub const MIN_PRICE_ROWS: usize = 2;

pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone)]
pub struct UniverseValidationResult {
    pub symbols: Vec<String>,
    pub skipped: Vec<SkippedSymbol>,
    /// Earliest first date and latest last date over the kept symbols.
    pub range: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientRows { rows: usize },
    SourceError(String),
}

/// Keep the symbols the price source can serve with at least two prices.
pub fn validate_universe(
    price_port: &dyn PricePort,
    symbols: Vec<String>,
) -> Result<UniverseValidationResult, EtfStatsError> {
    let mut valid = Vec::new();
    let mut skipped = Vec::new();
    let mut range: Option<(NaiveDate, NaiveDate)> = None;

    for symbol in symbols {
        let reason = match price_port.get_data_range(&symbol) {
            Ok(Some((first, last, rows))) if rows >= MIN_PRICE_ROWS => {
                info!(%symbol, rows, %first, %last, "symbol available");
                range = Some(match range {
                    Some((lo, hi)) => (lo.min(first), hi.max(last)),
                    None => (first, last),
                });
                valid.push(symbol);
                continue;
            }
            Ok(Some((_, _, rows))) => SkipReason::InsufficientRows { rows },
            Ok(None) => SkipReason::NoData,
            Err(e) => SkipReason::SourceError(e.to_string()),
        };

        warn!(%symbol, ?reason, "skipping symbol");
        skipped.push(SkippedSymbol { symbol, reason });
    }

    if valid.is_empty() {
        return Err(EtfStatsError::DataSource {
            reason: "no requested symbol has price data".to_string(),
        });
    }

    if !skipped.is_empty() {
        info!(
            kept = valid.len(),
            requested = valid.len() + skipped.len(),
            "universe reduced"
        );
    }

    Ok(UniverseValidationResult {
        symbols: valid,
        skipped,
        range,
    })
}
