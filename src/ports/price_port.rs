//! Price source port trait.

use crate::domain::error::EtfStatsError;
use crate::domain::price_table::PriceTable;
use chrono::NaiveDate;

/// Supplies aligned adjusted-close prices.
///
/// Implementations return one column per requested symbol they know about,
/// restricted to `start_date..=end_date`; symbols they do not carry are left
/// out of the table rather than reported as errors.
pub trait PricePort {
    fn fetch_prices(
        &self,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceTable, EtfStatsError>;

    fn list_symbols(&self) -> Result<Vec<String>, EtfStatsError>;

    /// First date, last date and observation count for one symbol.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EtfStatsError>;
}
