//! Display rounding for statistics tables.
//!
//! Everything upstream keeps full precision; values are rounded to two
//! decimals only when a row is built here.

use crate::domain::stats::AssetStats;

pub const STATS_HEADERS: [&str; 5] = ["Asset", "Mean", "Volatility", "Variance", "Sharpe Ratio"];
pub const NOT_AVAILABLE: &str = "N/A";

/// Two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round_ties_even() / 100.0;
    // avoid "-0.00"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// One statistics table row, rounded for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct StatsRow {
    pub symbol: String,
    pub mean: f64,
    pub volatility: Option<f64>,
    pub variance: Option<f64>,
    pub sharpe_ratio: Option<f64>,
}

fn display(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

impl StatsRow {
    pub fn cells(&self) -> [String; 5] {
        [
            self.symbol.clone(),
            format!("{:.2}", self.mean),
            display(self.volatility),
            display(self.variance),
            self.sharpe_display(),
        ]
    }

    pub fn sharpe_display(&self) -> String {
        display(self.sharpe_ratio)
    }
}

impl From<&AssetStats> for StatsRow {
    fn from(stats: &AssetStats) -> Self {
        Self {
            symbol: stats.symbol.clone(),
            mean: round2(stats.annualized_return),
            volatility: stats.annualized_volatility.map(round2),
            variance: stats.annualized_variance.map(round2),
            sharpe_ratio: stats.sharpe_ratio.as_ref().ok().map(|v| round2(*v)),
        }
    }
}

pub fn stats_rows<'a, I>(stats: I) -> Vec<StatsRow>
where
    I: IntoIterator<Item = &'a AssetStats>,
{
    stats.into_iter().map(StatsRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::StatsError;

    fn stats(sharpe: Result<f64, StatsError>) -> AssetStats {
        AssetStats {
            symbol: "XLK".into(),
            annualized_return: 0.18456,
            annualized_volatility: Some(0.21449),
            annualized_variance: Some(0.046),
            sharpe_ratio: sharpe,
        }
    }

    #[test]
    fn round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(-0.126), -0.13);
        assert_eq!(round2(25.2), 25.2);
    }

    #[test]
    fn round2_never_yields_negative_zero() {
        assert!(round2(-0.001).is_sign_positive());
    }

    #[test]
    fn row_rounds_all_figures() {
        let row = StatsRow::from(&stats(Ok(0.6271)));
        assert_eq!(row.mean, 0.18);
        assert_eq!(row.volatility, Some(0.21));
        assert_eq!(row.variance, Some(0.05));
        assert_eq!(row.sharpe_ratio, Some(0.63));
        assert_eq!(row.cells()[4], "0.63");
    }

    #[test]
    fn undefined_sharpe_displays_not_available() {
        let row = StatsRow::from(&stats(Err(StatsError::DivisionByZero {
            symbol: "XLK".into(),
        })));
        assert_eq!(row.sharpe_ratio, None);
        assert_eq!(row.sharpe_display(), "N/A");
    }

    #[test]
    fn undefined_dispersion_displays_not_available() {
        let mut single = stats(Err(StatsError::InsufficientData { rows: 2 }));
        single.annualized_volatility = None;
        single.annualized_variance = None;
        let row = StatsRow::from(&single);
        assert_eq!(row.volatility, None);
        assert_eq!(row.cells(), ["XLK", "0.18", "N/A", "N/A", "N/A"].map(String::from));
    }
}
