#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use etfstats::domain::error::EtfStatsError;
use etfstats::domain::market::MarketData;
use etfstats::domain::price_table::PriceTable;
use etfstats::domain::stats::StatsConfig;
use etfstats::ports::price_port::PricePort;
use std::collections::BTreeMap;

/// In-memory price source keyed by symbol.
pub struct MockPricePort {
    pub data: BTreeMap<String, Vec<(NaiveDate, f64)>>,
    pub errors: BTreeMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, prices: Vec<(NaiveDate, f64)>) -> Self {
        self.data.insert(symbol.to_string(), prices);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, EtfStatsError> {
        let mut columns = Vec::new();
        let mut observations = Vec::new();
        for symbol in symbols {
            if let Some(reason) = self.errors.get(symbol) {
                return Err(EtfStatsError::DataSource {
                    reason: reason.clone(),
                });
            }
            if let Some(prices) = self.data.get(symbol) {
                columns.push(symbol.clone());
                observations.extend(
                    prices
                        .iter()
                        .filter(|(d, _)| *d >= start_date && *d <= end_date)
                        .map(|&(d, p)| (symbol.clone(), d, p)),
                );
            }
        }
        PriceTable::from_observations(columns, observations)
    }

    fn list_symbols(&self) -> Result<Vec<String>, EtfStatsError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EtfStatsError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(EtfStatsError::DataSource {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(prices) if !prices.is_empty() => {
                let min = prices.iter().map(|(d, _)| *d).min().unwrap();
                let max = prices.iter().map(|(d, _)| *d).max().unwrap();
                Ok(Some((min, max, prices.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting at `start`.
pub fn days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count as u64)
        .map(|i| start.checked_add_days(Days::new(i)).unwrap())
        .collect()
}

/// A deterministic wavy price path.
pub fn generate_prices(start: &str, count: usize, base: f64) -> Vec<(NaiveDate, f64)> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
    days(start, count)
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let drift = 1.0 + 0.001 * i as f64;
            let wave = 1.0 + 0.02 * ((i as f64) * 0.7).sin();
            (d, base * drift * wave)
        })
        .collect()
}

/// Fully populated table from per-symbol price columns on consecutive days.
pub fn table(columns: &[(&str, &[f64])], start: NaiveDate) -> PriceTable {
    let len = columns.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    let rows = (0..len)
        .map(|r| columns.iter().map(|(_, c)| c.get(r).copied()).collect())
        .collect();
    PriceTable::new(
        columns.iter().map(|(s, _)| s.to_string()).collect(),
        days(start, len),
        rows,
    )
    .unwrap()
}

/// A market of three assets where GLD lists one day late.
pub fn sample_market() -> MarketData {
    let port = MockPricePort::new()
        .with_prices("SPY", generate_prices("2024-01-01", 30, 470.0))
        .with_prices("TLT", generate_prices("2024-01-01", 30, 95.0))
        .with_prices("GLD", generate_prices("2024-01-02", 29, 190.0));
    let symbols = vec!["SPY".to_string(), "TLT".to_string(), "GLD".to_string()];
    let prices = port
        .fetch_prices(&symbols, date(2024, 1, 1), date(2024, 12, 31))
        .unwrap();
    MarketData::new(prices, StatsConfig::default()).unwrap()
}
