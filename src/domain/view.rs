//! Selection of chart series and statistics for display.
//!
//! A request names a [`Mode`] and an inclusive date range; the selector
//! filters the shared [`MarketData`], normalizes the series when comparing
//! several assets, and picks the matching statistics rows.

use crate::domain::error::StatsError;
use crate::domain::market::MarketData;
use crate::domain::price_table::PriceTable;
use crate::domain::stats::AssetStats;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const TITLE_ALL: &str = "Normalized Performance of All Assets";
pub const TITLE_CUSTOM: &str = "Normalized Performance of Selected Assets";
pub const TITLE_CUSTOM_EMPTY: &str = "Select assets to build your chart";
pub const LABEL_NORMALIZED: &str = "Cumulative Returns";
pub const LABEL_PRICE: &str = "Price";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    All,
    Single(String),
    Custom(BTreeSet<String>),
}

impl Mode {
    /// Interpret a dashboard dropdown value plus the checklist contents.
    ///
    /// `all` and an empty choice select every asset; `custom` (or
    /// `personalized`) takes the checklist; anything else names one symbol.
    pub fn from_choice<I, S>(choice: &str, custom: I) -> Mode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let choice = choice.trim();
        match choice.to_lowercase().as_str() {
            "" | "all" => Mode::All,
            "custom" | "personalized" => Mode::Custom(
                custom
                    .into_iter()
                    .map(|s| s.as_ref().trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => Mode::Single(choice.to_uppercase()),
        }
    }

    pub fn state(&self) -> SelectionState {
        match self {
            Mode::All => SelectionState::All,
            Mode::Single(_) => SelectionState::Single,
            Mode::Custom(set) if set.is_empty() => SelectionState::CustomEmpty,
            Mode::Custom(_) => SelectionState::CustomNonEmpty,
        }
    }

    /// The dropdown value that reproduces this mode.
    pub fn choice(&self) -> &str {
        match self {
            Mode::All => "all",
            Mode::Single(symbol) => symbol.as_str(),
            Mode::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
#[cfg_attr(feature = "web", serde(rename_all = "snake_case"))]
pub enum SelectionState {
    All,
    Single,
    CustomEmpty,
    CustomNonEmpty,
}

/// Which rows the statistics subset is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsScope {
    /// Precomputed over the whole loaded history, regardless of the range.
    #[default]
    FullHistory,
    /// Recomputed over the filtered rows of each request.
    SelectedRange,
}

impl FromStr for StatsScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full_history" | "history" => Ok(StatsScope::FullHistory),
            "range" | "selected_range" => Ok(StatsScope::SelectedRange),
            other => Err(format!("unknown stats scope '{other}' (expected full or range)")),
        }
    }
}

impl fmt::Display for StatsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsScope::FullHistory => write!(f, "full"),
            StatsScope::SelectedRange => write!(f, "range"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "web", derive(serde::Serialize))]
pub struct LineSeries {
    pub symbol: String,
    pub points: Vec<SeriesPoint>,
}

pub type ChartSeries = Vec<LineSeries>;

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub state: SelectionState,
    pub title: String,
    pub y_label: &'static str,
    pub chart: ChartSeries,
    pub stats: Vec<AssetStats>,
}

impl Selection {
    fn no_selection() -> Self {
        Self {
            state: SelectionState::CustomEmpty,
            title: TITLE_CUSTOM_EMPTY.to_string(),
            y_label: LABEL_NORMALIZED,
            chart: Vec::new(),
            stats: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }
}

pub struct ViewSelector<'a> {
    market: &'a MarketData,
    scope: StatsScope,
}

impl<'a> ViewSelector<'a> {
    pub fn new(market: &'a MarketData) -> Self {
        Self {
            market,
            scope: StatsScope::default(),
        }
    }

    pub fn with_scope(mut self, scope: StatsScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn select(
        &self,
        mode: &Mode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Selection, StatsError> {
        if mode.state() == SelectionState::CustomEmpty {
            return Ok(Selection::no_selection());
        }

        let filtered = self.market.prices().filter_range(start, end);
        if filtered.is_empty() {
            return Err(StatsError::EmptyRange { start, end });
        }

        let symbols: Vec<String> = match mode {
            Mode::All => filtered.symbols().to_vec(),
            Mode::Single(symbol) => {
                if !filtered.contains(symbol) {
                    return Err(StatsError::UnknownSymbol(symbol.clone()));
                }
                vec![symbol.clone()]
            }
            Mode::Custom(set) => filtered
                .symbols()
                .iter()
                .filter(|s| set.contains(*s))
                .cloned()
                .collect(),
        };

        let view = filtered.select_columns(&symbols);
        let (title, y_label, chart) = match mode {
            Mode::All => (TITLE_ALL.to_string(), LABEL_NORMALIZED, normalize(&view)),
            Mode::Custom(_) => (TITLE_CUSTOM.to_string(), LABEL_NORMALIZED, normalize(&view)),
            Mode::Single(symbol) => (
                format!("Asset Performance: {symbol}"),
                LABEL_PRICE,
                raw_series(&view),
            ),
        };

        let stats = match self.scope {
            _ if symbols.is_empty() => Vec::new(),
            StatsScope::FullHistory => self.market.stats().subset(&symbols),
            StatsScope::SelectedRange => self.market.engine().compute(&view)?.into_vec(),
        };

        Ok(Selection {
            state: mode.state(),
            title,
            y_label,
            chart,
            stats,
        })
    }
}

/// Select with the default full-history statistics.
pub fn select(
    market: &MarketData,
    mode: &Mode,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Selection, StatsError> {
    ViewSelector::new(market).select(mode, start, end)
}

/// Divide each column by its own first present value.
pub fn normalize(prices: &PriceTable) -> ChartSeries {
    (0..prices.symbols().len())
        .map(|col| {
            let mut points = prices.column(col).peekable();
            let base = points.peek().map(|&(_, p)| p);
            LineSeries {
                symbol: prices.symbols()[col].clone(),
                points: match base {
                    Some(base) => points
                        .map(|(date, p)| SeriesPoint {
                            date,
                            value: p / base,
                        })
                        .collect(),
                    None => Vec::new(),
                },
            }
        })
        .collect()
}

fn raw_series(prices: &PriceTable) -> ChartSeries {
    (0..prices.symbols().len())
        .map(|col| LineSeries {
            symbol: prices.symbols()[col].clone(),
            points: prices
                .column(col)
                .map(|(date, value)| SeriesPoint { date, value })
                .collect(),
        })
        .collect()
}
