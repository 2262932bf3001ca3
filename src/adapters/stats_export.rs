//! CSV export of rounded statistics rows.

use crate::domain::error::EtfStatsError;
use crate::domain::presentation::{STATS_HEADERS, StatsRow};
use std::fs::{self, File};
use std::io;
use std::path::Path;

fn csv_error(e: csv::Error) -> EtfStatsError {
    EtfStatsError::Io(io::Error::other(e.to_string()))
}

/// Write the header row and one record per asset.
pub fn write_stats_csv<W: io::Write>(rows: &[StatsRow], writer: W) -> Result<(), EtfStatsError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(STATS_HEADERS).map_err(csv_error)?;
    for row in rows {
        wtr.write_record(row.cells()).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_stats_csv(rows: &[StatsRow], path: &Path) -> Result<(), EtfStatsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_stats_csv(rows, file)
}
