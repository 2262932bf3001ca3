//! SQLite price adapter.
//!
//! Reads adjusted closes from a `prices(symbol, date, adj_close)` table
//! through an r2d2 connection pool.

use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::error::EtfStatsError;
use crate::domain::price_table::PriceTable;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> EtfStatsError {
    EtfStatsError::DataSource {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> EtfStatsError {
    EtfStatsError::DataSource {
        reason: format!("query failed: {}", e),
    }
}

fn parse_row_date(date_str: String) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            date_str.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EtfStatsError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| EtfStatsError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, EtfStatsError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, EtfStatsError> {
        self.pool.get().map_err(pool_error)
    }

    pub fn initialize_schema(&self) -> Result<(), EtfStatsError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS prices (
                    symbol TEXT NOT NULL,
                    date TEXT NOT NULL,
                    adj_close REAL NOT NULL,
                    PRIMARY KEY (symbol, date)
                );
                CREATE INDEX IF NOT EXISTS idx_prices_date ON prices(date);",
            )
            .map_err(query_error)
    }

    /// Insert or replace `(symbol, date, adj_close)` rows in one transaction.
    pub fn insert_prices(&self, rows: &[(String, NaiveDate, f64)]) -> Result<(), EtfStatsError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_error)?;

        for (symbol, date, price) in rows {
            tx.execute(
                "INSERT OR REPLACE INTO prices (symbol, date, adj_close) VALUES (?1, ?2, ?3)",
                params![symbol, date.format(DATE_FORMAT).to_string(), price],
            )
            .map_err(query_error)?;
        }

        tx.commit().map_err(query_error)
    }
}

impl PricePort for SqliteAdapter {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, EtfStatsError> {
        let conn = self.conn()?;
        let start_str = start_date.format(DATE_FORMAT).to_string();
        let end_str = end_date.format(DATE_FORMAT).to_string();

        let mut stmt = conn
            .prepare(
                "SELECT date, adj_close FROM prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_error)?;

        let mut columns = Vec::new();
        let mut observations = Vec::new();
        for symbol in symbols {
            let rows = stmt
                .query_map(params![symbol, start_str, end_str], |row| {
                    Ok((parse_row_date(row.get(0)?)?, row.get::<_, f64>(1)?))
                })
                .map_err(query_error)?;

            let mut found = false;
            for row in rows {
                let (date, price) = row.map_err(query_error)?;
                observations.push((symbol.clone(), date, price));
                found = true;
            }
            if found {
                columns.push(symbol.clone());
            }
        }

        PriceTable::from_observations(columns, observations)
    }

    fn list_symbols(&self) -> Result<Vec<String>, EtfStatsError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM prices ORDER BY symbol")
            .map_err(query_error)?;

        let rows = stmt.query_map([], |row| row.get(0)).map_err(query_error)?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row.map_err(query_error)?);
        }
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EtfStatsError> {
        let conn = self.conn()?;
        let (min, max, count): (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_error)?;

        match (min, max) {
            (Some(min), Some(max)) if count > 0 => {
                let first = parse_row_date(min).map_err(query_error)?;
                let last = parse_row_date(max).map_err(query_error)?;
                Ok(Some((first, last, count as usize)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, day).unwrap()
    }

    fn seeded() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
            .insert_prices(&[
                ("SPY".into(), d(1), 490.0),
                ("SPY".into(), d(2), 495.0),
                ("SPY".into(), d(5), 493.0),
                ("TLT".into(), d(2), 95.0),
                ("TLT".into(), d(5), 94.5),
            ])
            .unwrap();
        adapter
    }

    #[test]
    fn fetch_prices_aligns_symbols() {
        let adapter = seeded();
        let table = adapter
            .fetch_prices(&["SPY".into(), "TLT".into()], d(1), d(29))
            .unwrap();

        assert_eq!(table.dates(), &[d(1), d(2), d(5)]);
        assert_eq!(table.price(0, 1), None);
        assert_eq!(table.price(1, 1), Some(95.0));
    }

    #[test]
    fn fetch_prices_filters_dates_and_skips_unknown() {
        let adapter = seeded();
        let table = adapter
            .fetch_prices(&["EWZ".into(), "SPY".into()], d(2), d(5))
            .unwrap();
        assert_eq!(table.symbols(), &["SPY".to_string()]);
        assert_eq!(table.dates(), &[d(2), d(5)]);
    }

    #[test]
    fn insert_replaces_existing_rows() {
        let adapter = seeded();
        adapter.insert_prices(&[("SPY".into(), d(1), 480.0)]).unwrap();
        let table = adapter.fetch_prices(&["SPY".into()], d(1), d(1)).unwrap();
        assert_eq!(table.price(0, 0), Some(480.0));
    }

    #[test]
    fn list_symbols_sorted() {
        let adapter = seeded();
        assert_eq!(adapter.list_symbols().unwrap(), vec!["SPY", "TLT"]);
    }

    #[test]
    fn data_range_for_known_and_unknown() {
        let adapter = seeded();
        assert_eq!(adapter.get_data_range("SPY").unwrap(), Some((d(1), d(5), 3)));
        assert_eq!(adapter.get_data_range("XLE").unwrap(), None);
    }
}
