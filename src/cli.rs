//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::stats_export::export_stats_csv;
use crate::domain::config_validation::{DATE_FORMAT, optional_date, validate_config};
use crate::domain::error::EtfStatsError;
use crate::domain::market::MarketData;
use crate::domain::presentation::{STATS_HEADERS, StatsRow, stats_rows};
use crate::domain::stats::{DEFAULT_ANNUAL_RISK_FREE_RATE, StatsConfig, TRADING_DAYS_PER_YEAR};
use crate::domain::universe::{default_symbols, parse_symbols, validate_universe};
use crate::domain::view::{Mode, Selection, StatsScope, ViewSelector};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::{Dashboard, ReportPort};

pub const DEFAULT_REPORT_PATH: &str = "etf_dashboard.html";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(
    name = "etfstats",
    about = "Annualized return, risk and Sharpe ratio for a universe of ETFs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// all, a symbol, or custom
    #[arg(long)]
    pub mode: Option<String>,
    /// Comma-separated symbols for custom mode
    #[arg(long)]
    pub custom: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    /// full or range
    #[arg(long)]
    pub scope: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print annualized statistics for every loaded asset
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
        /// Also write the rounded table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the chart series and statistics for a selection
    View {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Write the dashboard as a standalone HTML page
    Report {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        symbols: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// List symbols available in the price source
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        listen: Option<String>,
        #[arg(long)]
        symbols: Option<String>,
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Stats {
            config,
            symbols,
            csv,
        } => run_stats(&config, symbols.as_deref(), csv.as_deref()),
        Command::View {
            config,
            symbols,
            selection,
        } => run_view(&config, symbols.as_deref(), &selection),
        Command::Report {
            config,
            output,
            symbols,
            selection,
        } => run_report(&config, output.as_deref(), symbols.as_deref(), &selection),
        Command::Info { config, symbols } => run_info(&config, symbols.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
        Command::Validate { config } => run_validate(&config),
        Command::Serve {
            config,
            listen,
            symbols,
            selection,
        } => run_serve(&config, listen.as_deref(), symbols.as_deref(), &selection),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, EtfStatsError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_stats_config(config: &dyn ConfigPort) -> StatsConfig {
    let annual_rate = config.get_double("stats", "risk_free_rate", DEFAULT_ANNUAL_RISK_FREE_RATE);
    let trading_days = config.get_int("stats", "trading_days", TRADING_DAYS_PER_YEAR as i64);
    StatsConfig::from_annual_rate(annual_rate, trading_days as f64)
}

/// Symbols from the flag, then `[universe] symbols`, then the default universe.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, EtfStatsError> {
    let invalid = |e: crate::domain::universe::UniverseError| EtfStatsError::ConfigInvalid {
        section: "universe".into(),
        key: "symbols".into(),
        reason: e.to_string(),
    };

    if let Some(s) = symbols_override {
        return parse_symbols(s).map_err(invalid);
    }
    match config.get_string("universe", "symbols") {
        Some(s) if !s.trim().is_empty() => parse_symbols(&s).map_err(invalid),
        _ => Ok(default_symbols()),
    }
}

/// Mode from the flags, then `[view] mode/custom`, defaulting to all assets.
pub fn resolve_mode(args: &SelectionArgs, config: &dyn ConfigPort) -> Mode {
    let choice = args
        .mode
        .clone()
        .or_else(|| config.get_string("view", "mode"))
        .unwrap_or_else(|| "all".to_string());
    let custom: Vec<String> = match &args.custom {
        Some(list) => list.split(',').map(str::to_string).collect(),
        None => config.get_list("view", "custom"),
    };
    Mode::from_choice(&choice, custom)
}

pub fn resolve_scope(
    args: &SelectionArgs,
    config: &dyn ConfigPort,
) -> Result<StatsScope, EtfStatsError> {
    match args.scope.clone().or_else(|| config.get_string("stats", "scope")) {
        None => Ok(StatsScope::default()),
        Some(s) => s.parse().map_err(|reason| EtfStatsError::ConfigInvalid {
            section: "stats".into(),
            key: "scope".into(),
            reason,
        }),
    }
}

/// Flags first, then the loaded history.
pub fn resolve_range(
    args: &SelectionArgs,
    market: &MarketData,
) -> Result<(NaiveDate, NaiveDate), EtfStatsError> {
    let (first, last) = market.full_range().ok_or_else(|| EtfStatsError::DataSource {
        reason: "no price rows loaded".into(),
    })?;
    Ok((args.start.unwrap_or(first), args.end.unwrap_or(last)))
}

pub fn build_price_port(config: &dyn ConfigPort) -> Result<Box<dyn PricePort>, EtfStatsError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());

    match source.trim().to_lowercase().as_str() {
        "csv" => {
            let path = config
                .get_string("data", "path")
                .ok_or_else(|| EtfStatsError::ConfigMissing {
                    section: "data".into(),
                    key: "path".into(),
                })?;
            let layout = config
                .get_string("data", "layout")
                .unwrap_or_else(|| "wide".to_string());
            let adapter = match layout.trim().to_lowercase().as_str() {
                "per_symbol" => CsvAdapter::per_symbol(PathBuf::from(path)),
                _ => CsvAdapter::wide(PathBuf::from(path)),
            };
            Ok(Box::new(adapter))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let adapter = crate::adapters::sqlite_adapter::SqliteAdapter::from_config(config)?;
            Ok(Box::new(adapter))
        }
        other => Err(EtfStatsError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unsupported source '{other}'"),
        }),
    }
}

/// Validate config, check the universe against the source and load prices.
pub fn load_market(
    config: &dyn ConfigPort,
    symbols_override: Option<&str>,
) -> Result<MarketData, EtfStatsError> {
    validate_config(config)?;
    let port = build_price_port(config)?;
    let requested = resolve_symbols(symbols_override, config)?;

    let universe = validate_universe(port.as_ref(), requested)?;
    let (first, last) = universe.range.ok_or_else(|| EtfStatsError::DataSource {
        reason: "price source reported no dates".into(),
    })?;
    let start = optional_date(config, "universe", "start_date")?.unwrap_or(first);
    let end = optional_date(config, "universe", "end_date")?.unwrap_or(last);

    let prices = port.fetch_prices(&universe.symbols, start, end)?;
    info!(
        symbols = prices.symbols().len(),
        rows = prices.len(),
        %start,
        %end,
        "prices loaded"
    );

    Ok(MarketData::new(prices, build_stats_config(config))?)
}

fn select(
    config: &dyn ConfigPort,
    market: &MarketData,
    args: &SelectionArgs,
) -> Result<(Selection, NaiveDate, NaiveDate), EtfStatsError> {
    let mode = resolve_mode(args, config);
    let scope = resolve_scope(args, config)?;
    let (start, end) = resolve_range(args, market)?;
    let selection = ViewSelector::new(market)
        .with_scope(scope)
        .select(&mode, start, end)?;
    Ok((selection, start, end))
}

pub fn format_stats_table(rows: &[StatsRow]) -> String {
    let mut out = format!(
        "{:<8} {:>10} {:>12} {:>10} {:>14}\n",
        STATS_HEADERS[0], STATS_HEADERS[1], STATS_HEADERS[2], STATS_HEADERS[3], STATS_HEADERS[4]
    );
    for row in rows {
        let [symbol, mean, vol, var, sharpe] = row.cells();
        out.push_str(&format!(
            "{:<8} {:>10} {:>12} {:>10} {:>14}\n",
            symbol, mean, vol, var, sharpe
        ));
    }
    out
}

fn run_stats(
    config_path: &Path,
    symbols: Option<&str>,
    csv_path: Option<&Path>,
) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    let market = load_market(&config, symbols)?;

    let rows = stats_rows(market.stats());
    print!("{}", format_stats_table(&rows));

    if let Some(path) = csv_path {
        export_stats_csv(&rows, path)?;
        info!(path = %path.display(), "stats exported");
    }
    Ok(())
}

fn run_view(
    config_path: &Path,
    symbols: Option<&str>,
    args: &SelectionArgs,
) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    let market = load_market(&config, symbols)?;
    let (selection, start, end) = select(&config, &market, args)?;

    println!("{}", selection.title);
    println!("{} to {} ({})", start, end, selection.y_label);
    for line in &selection.chart {
        match (line.points.first(), line.points.last()) {
            (Some(first), Some(last)) => println!(
                "  {:<8} {:>5} points  {} {:>10.4}  {} {:>10.4}",
                line.symbol,
                line.points.len(),
                first.date,
                first.value,
                last.date,
                last.value
            ),
            _ => println!("  {:<8} no points", line.symbol),
        }
    }
    if !selection.stats.is_empty() {
        println!();
        print!("{}", format_stats_table(&stats_rows(&selection.stats)));
    }
    Ok(())
}

fn run_report(
    config_path: &Path,
    output: Option<&Path>,
    symbols: Option<&str>,
    args: &SelectionArgs,
) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    let market = load_market(&config, symbols)?;
    let (selection, start_date, end_date) = select(&config, &market, args)?;

    let output_path = output
        .map(|p| p.display().to_string())
        .or_else(|| config.get_string("report", "output"))
        .unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string());

    let dashboard = Dashboard {
        market: &market,
        selection: &selection,
        start_date,
        end_date,
    };
    HtmlReportAdapter::new().write(&dashboard, &output_path)?;
    eprintln!("Report written to {output_path}");
    Ok(())
}

fn run_info(config_path: &Path, symbols: Option<&str>) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let port = build_price_port(&config)?;

    for symbol in resolve_symbols(symbols, &config)? {
        match port.get_data_range(&symbol) {
            Ok(Some((first, last, count))) => println!(
                "{}: {} prices, {} to {}",
                symbol,
                count,
                first.format(DATE_FORMAT),
                last.format(DATE_FORMAT)
            ),
            Ok(None) => eprintln!("{symbol}: no data found"),
            Err(e) => warn!(%symbol, error = %e, "data range query failed"),
        }
    }
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;
    let symbols = build_price_port(&config)?.list_symbols()?;

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), EtfStatsError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let stats_config = build_stats_config(&config);
    let symbols = resolve_symbols(None, &config)?;
    let mode = resolve_mode(&SelectionArgs::default(), &config);
    let scope = resolve_scope(&SelectionArgs::default(), &config)?;

    eprintln!("Symbols ({}): {}", symbols.len(), symbols.join(", "));
    eprintln!(
        "Risk-free rate: {:.4} annual, {:.6} daily over {} trading days",
        stats_config.risk_free_annualized(),
        stats_config.risk_free_daily_rate,
        stats_config.trading_days_per_year
    );
    eprintln!("Default view: {}", mode.choice());
    eprintln!("Stats scope: {scope}");
    eprintln!("\nConfiguration is valid.");
    Ok(())
}

#[cfg(feature = "web")]
fn run_serve(
    config_path: &Path,
    listen: Option<&str>,
    symbols: Option<&str>,
    args: &SelectionArgs,
) -> Result<(), EtfStatsError> {
    use crate::adapters::web::{AppState, build_router};
    use std::net::SocketAddr;
    use std::sync::Arc;

    let config = load_config(config_path)?;
    let market = load_market(&config, symbols)?;
    let mode = resolve_mode(args, &config);
    let scope = resolve_scope(args, &config)?;
    let (start, end) = resolve_range(args, &market)?;

    let listen = listen
        .map(str::to_string)
        .or_else(|| config.get_string("web", "listen"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let addr: SocketAddr = listen.parse().map_err(|_| EtfStatsError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("invalid socket address '{listen}'"),
    })?;

    let state = AppState::new(Arc::new(market), scope)
        .ok_or_else(|| EtfStatsError::DataSource {
            reason: "no price rows loaded".into(),
        })?
        .with_default_mode(mode)
        .with_default_range(start, end);
    let router = build_router(state);

    info!(%addr, "starting web server");
    tokio::runtime::Runtime::new()?.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    })?;
    Ok(())
}

#[cfg(not(feature = "web"))]
fn run_serve(
    _config_path: &Path,
    _listen: Option<&str>,
    _symbols: Option<&str>,
    _args: &SelectionArgs,
) -> Result<(), EtfStatsError> {
    Err(EtfStatsError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: "this build does not include the web feature".into(),
    })
}
