//! Immutable market data context shared by every selection request.

use crate::domain::error::StatsError;
use crate::domain::price_table::PriceTable;
use crate::domain::stats::{StatsConfig, StatsEngine, StatsTable};
use chrono::NaiveDate;

/// The loaded price table together with its full-history statistics.
///
/// Built once after the price source returns and never mutated; the web
/// adapter shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct MarketData {
    prices: PriceTable,
    stats: StatsTable,
    engine: StatsEngine,
}

impl MarketData {
    pub fn new(prices: PriceTable, config: StatsConfig) -> Result<Self, StatsError> {
        let engine = StatsEngine::new(config);
        let stats = engine.compute(&prices)?;
        Ok(Self {
            prices,
            stats,
            engine,
        })
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn stats(&self) -> &StatsTable {
        &self.stats
    }

    pub fn engine(&self) -> &StatsEngine {
        &self.engine
    }

    pub fn symbols(&self) -> &[String] {
        self.prices.symbols()
    }

    /// First and last loaded dates, the default date range.
    pub fn full_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.prices.first_date()?, self.prices.last_date()?))
    }
}
