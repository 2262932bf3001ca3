//! Aligned adjusted-close price table and the return series derived from it.

use crate::domain::error::EtfStatsError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

/// Adjusted-close prices indexed by date (rows) and symbol (columns).
///
/// Dates are strictly increasing, symbols are unique, and every present
/// price is finite and positive. A cell is `None` where the source had no
/// observation for that symbol on that date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(
        symbols: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, EtfStatsError> {
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(EtfStatsError::DuplicateSymbol(symbol.clone()));
            }
        }

        if rows.len() != dates.len() {
            return Err(EtfStatsError::DataSource {
                reason: format!("{} dates but {} price rows", dates.len(), rows.len()),
            });
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(EtfStatsError::UnorderedDates {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        for (date, row) in dates.iter().zip(&rows) {
            if row.len() != symbols.len() {
                return Err(EtfStatsError::DataSource {
                    reason: format!(
                        "row for {} has {} values, expected {}",
                        date,
                        row.len(),
                        symbols.len()
                    ),
                });
            }
            for (symbol, cell) in symbols.iter().zip(row) {
                if let Some(price) = *cell {
                    if !price.is_finite() || price <= 0.0 {
                        return Err(EtfStatsError::InvalidPrice {
                            symbol: symbol.clone(),
                            date: *date,
                            value: price,
                        });
                    }
                }
            }
        }

        Ok(Self {
            symbols,
            dates,
            rows,
        })
    }

    /// Align per-symbol observations onto the union of their dates.
    ///
    /// Column order follows `symbols`; a symbol with no observations still
    /// gets an all-missing column.
    pub fn from_observations<I>(symbols: Vec<String>, observations: I) -> Result<Self, EtfStatsError>
    where
        I: IntoIterator<Item = (String, NaiveDate, f64)>,
    {
        let index: BTreeMap<&str, usize> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();

        let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
        for (symbol, date, price) in observations {
            let Some(&col) = index.get(symbol.as_str()) else {
                continue;
            };
            by_date
                .entry(date)
                .or_insert_with(|| vec![None; symbols.len()])[col] = Some(price);
        }

        let (dates, rows) = by_date.into_iter().unzip();
        Self::new(symbols, dates, rows)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column_index(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.column_index(symbol).is_some()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn price(&self, row: usize, col: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Present observations of one column, in date order.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.rows)
            .filter_map(move |(date, row)| row.get(col).copied().flatten().map(|p| (*date, p)))
    }

    /// Rows with `start <= date <= end`, all columns kept.
    pub fn filter_range(&self, start: NaiveDate, end: NaiveDate) -> PriceTable {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        PriceTable {
            symbols: self.symbols.clone(),
            dates: self.dates[lo..hi].to_vec(),
            rows: self.rows[lo..hi].to_vec(),
        }
    }

    /// Keep only the named columns, in the order given. Unknown names are skipped.
    pub fn select_columns(&self, symbols: &[String]) -> PriceTable {
        let cols: Vec<usize> = symbols
            .iter()
            .filter_map(|s| self.column_index(s))
            .collect();
        PriceTable {
            symbols: cols.iter().map(|&c| self.symbols[c].clone()).collect(),
            dates: self.dates.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| cols.iter().map(|&c| row[c]).collect())
                .collect(),
        }
    }

    /// Day-over-day percentage change, first row dropped.
    ///
    /// Gaps are padded with the last observed price before differencing. A
    /// row whose return is still undefined for any symbol (no earlier
    /// observation to compare against) is dropped for every symbol.
    pub fn returns(&self) -> ReturnSeries {
        let width = self.symbols.len();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); width];
        let mut dates = Vec::new();

        let mut filled: Vec<Option<f64>> = match self.rows.first() {
            Some(first) => first.clone(),
            None => vec![None; width],
        };

        for (date, row) in self.dates.iter().zip(&self.rows).skip(1) {
            let mut values = Vec::with_capacity(width);
            for (slot, cell) in filled.iter_mut().zip(row) {
                let current = cell.or(*slot);
                match (*slot, current) {
                    (Some(prev), Some(curr)) => values.push(Some(curr / prev - 1.0)),
                    _ => values.push(None),
                }
                *slot = current;
            }

            if values.iter().all(Option::is_some) {
                dates.push(*date);
                for (column, value) in columns.iter_mut().zip(values) {
                    column.extend(value);
                }
            }
        }

        ReturnSeries {
            symbols: self.symbols.clone(),
            dates,
            columns,
        }
    }
}

/// Daily simple returns, one column per symbol, all columns the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    symbols: Vec<String>,
    dates: Vec<NaiveDate>,
    columns: Vec<Vec<f64>>,
}

impl ReturnSeries {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.columns[col]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.symbols
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}
