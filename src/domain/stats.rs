//! Per-asset annualized return statistics.
//!
//! For every column of a [`PriceTable`] the engine derives daily simple
//! returns and annualizes their sample mean, standard deviation and
//! variance, then computes a Sharpe ratio against a daily risk-free rate.
//!
//! A single return has a mean but no sample dispersion; volatility and
//! variance are then `None` and the Sharpe ratio is `InsufficientData`.

use crate::domain::error::StatsError;
use crate::domain::price_table::PriceTable;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DEFAULT_ANNUAL_RISK_FREE_RATE: f64 = 0.05;

/// Volatility at or below this is treated as zero.
const ZERO_VOLATILITY: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsConfig {
    pub risk_free_daily_rate: f64,
    pub trading_days_per_year: f64,
}

impl StatsConfig {
    /// Build from an annual risk-free rate, spread evenly over the trading year.
    pub fn from_annual_rate(annual_rate: f64, trading_days_per_year: f64) -> Self {
        Self {
            risk_free_daily_rate: annual_rate / trading_days_per_year,
            trading_days_per_year,
        }
    }

    pub fn risk_free_annualized(&self) -> f64 {
        self.risk_free_daily_rate * self.trading_days_per_year
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self::from_annual_rate(DEFAULT_ANNUAL_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR)
    }
}

/// Full-precision statistics for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetStats {
    pub symbol: String,
    pub annualized_return: f64,
    pub annualized_volatility: Option<f64>,
    pub annualized_variance: Option<f64>,
    pub sharpe_ratio: Result<f64, StatsError>,
}

/// Statistics for every column of a price table, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsTable {
    entries: Vec<AssetStats>,
}

impl StatsTable {
    pub fn get(&self, symbol: &str) -> Option<&AssetStats> {
        self.entries.iter().find(|s| s.symbol == symbol)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetStats> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.symbol.as_str())
    }

    /// Entries whose symbol is in `symbols`, keeping this table's order.
    pub fn subset(&self, symbols: &[String]) -> Vec<AssetStats> {
        self.entries
            .iter()
            .filter(|s| symbols.contains(&s.symbol))
            .cloned()
            .collect()
    }

    pub fn into_vec(self) -> Vec<AssetStats> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a StatsTable {
    type Item = &'a AssetStats;
    type IntoIter = std::slice::Iter<'a, AssetStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine {
    config: StatsConfig,
}

impl StatsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn compute(&self, prices: &PriceTable) -> Result<StatsTable, StatsError> {
        if prices.len() < 2 {
            return Err(StatsError::InsufficientData { rows: prices.len() });
        }

        let returns = prices.returns();
        if returns.is_empty() {
            return Err(StatsError::InsufficientData { rows: prices.len() });
        }
        let rows = prices.len();

        let days = self.config.trading_days_per_year;
        let rf_annual = self.config.risk_free_annualized();

        let entries = returns
            .iter()
            .map(|(symbol, series)| {
                let mean = mean(series);
                let variance = sample_variance(series, mean);
                let annualized_return = mean * days;
                let annualized_volatility = variance.map(|v| v.sqrt() * days.sqrt());
                let annualized_variance = variance.map(|v| v * days);

                let sharpe_ratio = match annualized_volatility {
                    None => Err(StatsError::InsufficientData { rows }),
                    Some(vol) if vol <= ZERO_VOLATILITY => Err(StatsError::DivisionByZero {
                        symbol: symbol.to_string(),
                    }),
                    Some(vol) => Ok((annualized_return - rf_annual) / vol),
                };

                AssetStats {
                    symbol: symbol.to_string(),
                    annualized_return,
                    annualized_volatility,
                    annualized_variance,
                    sharpe_ratio,
                }
            })
            .collect();

        Ok(StatsTable { entries })
    }
}

/// Convenience wrapper over [`StatsEngine`] with the default trading year.
pub fn compute_stats(
    prices: &PriceTable,
    risk_free_daily_rate: f64,
) -> Result<StatsTable, StatsError> {
    StatsEngine::new(StatsConfig {
        risk_free_daily_rate,
        trading_days_per_year: TRADING_DAYS_PER_YEAR,
    })
    .compute(prices)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// N-1 denominator, undefined below two values.
fn sample_variance(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64)
}
