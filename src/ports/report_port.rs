//! Rendering surface port trait.

use crate::domain::error::EtfStatsError;
use crate::domain::market::MarketData;
use crate::domain::view::Selection;
use chrono::NaiveDate;

/// Everything a rendering surface needs for one dashboard page.
pub struct Dashboard<'a> {
    pub market: &'a MarketData,
    pub selection: &'a Selection,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Port for writing a rendered dashboard.
pub trait ReportPort {
    fn write(&self, dashboard: &Dashboard<'_>, output_path: &str) -> Result<(), EtfStatsError>;
}
