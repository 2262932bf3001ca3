//! CSV file price adapter.
//!
//! Two layouts are supported:
//! - `wide`: a single file with a `Date` column followed by one adjusted-close
//!   column per symbol (the shape of a saved multi-ticker download);
//! - `per_symbol`: a directory of `{SYMBOL}.csv` files with a provider-style
//!   `Date,Open,High,Low,Close,Adj Close,Volume` header.

use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::EtfStatsError;
use crate::domain::price_table::PriceTable;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    Wide,
    PerSymbol,
}

pub struct CsvAdapter {
    path: PathBuf,
    layout: CsvLayout,
}

type Observations = Vec<(String, NaiveDate, f64)>;

impl CsvAdapter {
    pub fn wide(file: PathBuf) -> Self {
        Self {
            path: file,
            layout: CsvLayout::Wide,
        }
    }

    pub fn per_symbol(dir: PathBuf) -> Self {
        Self {
            path: dir,
            layout: CsvLayout::PerSymbol,
        }
    }

    pub fn layout(&self) -> CsvLayout {
        self.layout
    }

    fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.path.join(format!("{}.csv", symbol))
    }

    fn read_wide(&self) -> Result<(Vec<String>, Observations), EtfStatsError> {
        let mut rdr = open_reader(&self.path)?;
        let headers = rdr.headers().map_err(csv_error)?.clone();
        let symbols: Vec<String> = headers
            .iter()
            .skip(1)
            .map(|h| h.trim().to_uppercase())
            .collect();

        let mut observations = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_error)?;
            let date = parse_date(record.get(0))?;
            for (symbol, cell) in symbols.iter().zip(record.iter().skip(1)) {
                if let Some(price) = parse_price(cell, symbol)? {
                    observations.push((symbol.clone(), date, price));
                }
            }
        }
        Ok((symbols, observations))
    }

    fn read_symbol_file(&self, symbol: &str) -> Result<Observations, EtfStatsError> {
        let path = self.symbol_path(symbol);
        let mut rdr = open_reader(&path)?;
        let headers = rdr.headers().map_err(csv_error)?.clone();

        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let date_col = find("date").unwrap_or(0);
        let price_col = find("adj close")
            .or_else(|| find("adj_close"))
            .or_else(|| find("close"))
            .ok_or_else(|| EtfStatsError::DataSource {
                reason: format!("{}: no Adj Close or Close column", path.display()),
            })?;

        let mut observations = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(csv_error)?;
            let date = parse_date(record.get(date_col))?;
            if let Some(price) = parse_price(record.get(price_col).unwrap_or(""), symbol)? {
                observations.push((symbol.to_string(), date, price));
            }
        }
        Ok(observations)
    }

    fn available_symbols(&self) -> Result<Vec<String>, EtfStatsError> {
        match self.layout {
            CsvLayout::Wide => Ok(self.read_wide()?.0),
            CsvLayout::PerSymbol => {
                let entries = fs::read_dir(&self.path).map_err(|e| EtfStatsError::DataSource {
                    reason: format!("failed to read directory {}: {}", self.path.display(), e),
                })?;

                let mut symbols = Vec::new();
                for entry in entries {
                    let entry = entry.map_err(|e| EtfStatsError::DataSource {
                        reason: format!("directory entry error: {}", e),
                    })?;
                    let name = entry.file_name();
                    let name = name.to_string_lossy();
                    if let Some(symbol) = name.strip_suffix(".csv") {
                        symbols.push(symbol.to_uppercase());
                    }
                }
                symbols.sort();
                Ok(symbols)
            }
        }
    }
}

impl PricePort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, EtfStatsError> {
        let (columns, observations) = match self.layout {
            CsvLayout::Wide => {
                let (available, observations) = self.read_wide()?;
                let columns: Vec<String> = symbols
                    .iter()
                    .filter(|s| available.contains(s))
                    .cloned()
                    .collect();
                (columns, observations)
            }
            CsvLayout::PerSymbol => {
                let mut columns = Vec::new();
                let mut observations = Vec::new();
                for symbol in symbols {
                    if !self.symbol_path(symbol).exists() {
                        debug!(%symbol, "no csv file for symbol");
                        continue;
                    }
                    observations.extend(self.read_symbol_file(symbol)?);
                    columns.push(symbol.clone());
                }
                (columns, observations)
            }
        };

        PriceTable::from_observations(
            columns,
            observations
                .into_iter()
                .filter(|(_, date, _)| *date >= start_date && *date <= end_date),
        )
    }

    fn list_symbols(&self) -> Result<Vec<String>, EtfStatsError> {
        self.available_symbols()
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EtfStatsError> {
        let observations = match self.layout {
            CsvLayout::Wide => self.read_wide()?.1,
            CsvLayout::PerSymbol => {
                if !self.symbol_path(symbol).exists() {
                    return Ok(None);
                }
                self.read_symbol_file(symbol)?
            }
        };

        let dates: BTreeSet<NaiveDate> = observations
            .into_iter()
            .filter(|(s, _, _)| s == symbol)
            .map(|(_, date, _)| date)
            .collect();

        match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => Ok(Some((*first, *last, dates.len()))),
            _ => Ok(None),
        }
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>, EtfStatsError> {
    let file = fs::File::open(path).map_err(|e| EtfStatsError::DataSource {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

fn csv_error(e: csv::Error) -> EtfStatsError {
    EtfStatsError::DataSource {
        reason: format!("CSV parse error: {}", e),
    }
}

fn parse_date(value: Option<&str>) -> Result<NaiveDate, EtfStatsError> {
    let raw = value.ok_or_else(|| EtfStatsError::DataSource {
        reason: "missing date column".into(),
    })?;
    // Accept timestamps such as "2014-01-02 00:00:00".
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, DATE_FORMAT).map_err(|e| EtfStatsError::DataSource {
        reason: format!("invalid date '{}': {}", raw, e),
    })
}

/// Empty cells and `NaN` are missing observations.
fn parse_price(cell: &str, symbol: &str) -> Result<Option<f64>, EtfStatsError> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| EtfStatsError::DataSource {
            reason: format!("invalid price '{}' for {}: {}", cell, symbol, e),
        })
}
