//! etfstats: annualized return, volatility, variance and Sharpe ratio for a
//! universe of ETFs, with a selection layer for charting normalized
//! performance over a date range.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
