//! Configuration validation.
//!
//! Checks every section the CLI and web server read before any data is
//! loaded, so a bad INI file fails fast with the offending key.

use crate::domain::error::EtfStatsError;
use crate::domain::universe::parse_symbols;
use crate::domain::view::StatsScope;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), EtfStatsError> {
    validate_data_source(config)?;
    validate_stats(config)?;
    validate_universe(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> EtfStatsError {
    EtfStatsError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn missing(section: &str, key: &str) -> EtfStatsError {
    EtfStatsError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), EtfStatsError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.trim().to_lowercase().as_str() {
        "csv" => {
            match config.get_string("data", "path") {
                Some(p) if !p.trim().is_empty() => {}
                _ => return Err(missing("data", "path")),
            }
            let layout = config
                .get_string("data", "layout")
                .unwrap_or_else(|| "wide".to_string());
            match layout.trim().to_lowercase().as_str() {
                "wide" | "per_symbol" => Ok(()),
                other => Err(invalid(
                    "data",
                    "layout",
                    format!("unknown layout '{other}' (expected wide or per_symbol)"),
                )),
            }
        }
        "sqlite" => match config.get_string("sqlite", "path") {
            Some(p) if !p.trim().is_empty() => Ok(()),
            _ => Err(missing("sqlite", "path")),
        },
        other => Err(invalid(
            "data",
            "source",
            format!("unknown source '{other}' (expected csv or sqlite)"),
        )),
    }
}

fn validate_stats(config: &dyn ConfigPort) -> Result<(), EtfStatsError> {
    let rate = config.get_double("stats", "risk_free_rate", 0.05);
    if !(0.0..1.0).contains(&rate) {
        return Err(invalid(
            "stats",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }

    let days = config.get_int("stats", "trading_days", 252);
    if !(1..=366).contains(&days) {
        return Err(invalid(
            "stats",
            "trading_days",
            "trading_days must be between 1 and 366",
        ));
    }

    if let Some(scope) = config.get_string("stats", "scope") {
        scope
            .parse::<StatsScope>()
            .map_err(|reason| invalid("stats", "scope", reason))?;
    }
    Ok(())
}

fn validate_universe(config: &dyn ConfigPort) -> Result<(), EtfStatsError> {
    if let Some(symbols) = config.get_string("universe", "symbols") {
        parse_symbols(&symbols).map_err(|e| invalid("universe", "symbols", e.to_string()))?;
    }

    let start = optional_date(config, "universe", "start_date")?;
    let end = optional_date(config, "universe", "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(invalid(
                "universe",
                "start_date",
                "start_date must not be after end_date",
            ));
        }
    }
    Ok(())
}

/// Parse an optional `YYYY-MM-DD` value.
pub fn optional_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, EtfStatsError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid(section, key, format!("invalid {key} format, expected YYYY-MM-DD"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        let config = make_config(
            r#"
[data]
source = csv
path = prices.csv
layout = wide

[universe]
symbols = SPY,TLT,GLD
start_date = 2014-01-01
end_date = 2024-08-29

[stats]
risk_free_rate = 0.05
trading_days = 252
scope = full
"#,
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn csv_source_requires_path() {
        let config = make_config("[data]\nsource = csv\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigMissing { key, .. } if key == "path"));
    }

    #[test]
    fn unknown_layout_fails() {
        let config = make_config("[data]\npath = p.csv\nlayout = long\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "layout"));
    }

    #[test]
    fn sqlite_source_requires_sqlite_path() {
        let config = make_config("[data]\nsource = sqlite\n");
        let err = validate_config(&config).unwrap_err();
        assert!(
            matches!(err, EtfStatsError::ConfigMissing { section, key } if section == "sqlite" && key == "path")
        );
    }

    #[test]
    fn unknown_source_fails() {
        let config = make_config("[data]\nsource = yahoo\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[test]
    fn risk_free_rate_out_of_range() {
        let config = make_config("[data]\npath = p.csv\n[stats]\nrisk_free_rate = 1.5\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "risk_free_rate"));
    }

    #[test]
    fn trading_days_out_of_range() {
        let config = make_config("[data]\npath = p.csv\n[stats]\ntrading_days = 0\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "trading_days"));
    }

    #[test]
    fn bad_scope_fails() {
        let config = make_config("[data]\npath = p.csv\n[stats]\nscope = weekly\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "scope"));
    }

    #[test]
    fn duplicate_symbols_fail() {
        let config = make_config("[data]\npath = p.csv\n[universe]\nsymbols = SPY,spy\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "symbols"));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config(
            "[data]\npath = p.csv\n[universe]\nstart_date = 2024-01-02\nend_date = 2024-01-01\n",
        );
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn invalid_date_format_fails() {
        let config = make_config("[data]\npath = p.csv\n[universe]\nend_date = 2024/01/01\n");
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, EtfStatsError::ConfigInvalid { key, .. } if key == "end_date"));
    }

    #[test]
    fn optional_date_absent_is_none() {
        let config = make_config("[universe]\n");
        assert_eq!(optional_date(&config, "universe", "start_date").unwrap(), None);
    }
}
