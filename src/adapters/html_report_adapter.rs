//! HTML report adapter implementing ReportPort.
//!
//! Writes a standalone dashboard page using Askama templates with an
//! inline SVG chart.

use std::fs;
use std::path::Path;

use crate::adapters::chart_svg::render_line_chart;
use crate::domain::error::EtfStatsError;
use crate::domain::presentation::{STATS_HEADERS, StatsRow, stats_rows};
use crate::ports::report_port::{Dashboard, ReportPort};
use chrono::NaiveDate;
use tracing::info;

use askama::Template;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    chart_svg: String,
    headers: &'a [&'a str],
    rows: Vec<StatsRow>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    symbols: &'a [String],
    risk_free_rate: String,
    trading_days: f64,
}

pub fn render_dashboard(dashboard: &Dashboard<'_>) -> Result<String, EtfStatsError> {
    let selection = dashboard.selection;
    let config = dashboard.market.engine().config();

    let template = ReportTemplate {
        title: &selection.title,
        chart_svg: render_line_chart(&selection.chart, selection.y_label),
        headers: &STATS_HEADERS,
        rows: stats_rows(&selection.stats),
        start_date: dashboard.start_date,
        end_date: dashboard.end_date,
        symbols: dashboard.market.symbols(),
        risk_free_rate: format!("{:.2}%", config.risk_free_annualized() * 100.0),
        trading_days: config.trading_days_per_year,
    };

    template.render().map_err(|e| EtfStatsError::Render {
        reason: e.to_string(),
    })
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, dashboard: &Dashboard<'_>, output_path: &str) -> Result<(), EtfStatsError> {
        let html = render_dashboard(dashboard)?;

        let path = Path::new(output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, html)?;

        info!(path = %output_path, title = %dashboard.selection.title, "report written");
        Ok(())
    }
}
