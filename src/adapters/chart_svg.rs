//! Inline SVG line charts for the dashboard.
//!
//! Every series shares one date axis; x positions come from the calendar
//! date so assets with different listing dates line up.

use crate::domain::view::LineSeries;
use chrono::NaiveDate;
use std::fmt::Write;

pub const CHART_WIDTH: f64 = 800.0;
pub const CHART_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 110.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;
const LEGEND_ROW: f64 = 16.0;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const EMPTY_CHART_TEXT: &str = "No data to display";

pub fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_axis_value(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn svg_open(svg: &mut String) {
    let _ = writeln!(
        svg,
        r##"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"##,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
}

fn empty_chart() -> String {
    let mut svg = String::new();
    svg_open(&mut svg);
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#999\">{}</text>",
        CHART_WIDTH / 2.0,
        CHART_HEIGHT / 2.0,
        EMPTY_CHART_TEXT
    );
    svg.push_str("</svg>\n");
    svg
}

/// Render one polyline per series with axes, date ticks and a legend.
///
/// Returns a placeholder chart when no series has a point.
pub fn render_line_chart(series: &[LineSeries], y_label: &str) -> String {
    let points = series.iter().flat_map(|s| s.points.iter());
    let mut min_date: Option<NaiveDate> = None;
    let mut max_date: Option<NaiveDate> = None;
    let mut min_value = f64::INFINITY;
    let mut max_value = f64::NEG_INFINITY;
    for p in points {
        min_date = Some(min_date.map_or(p.date, |d| d.min(p.date)));
        max_date = Some(max_date.map_or(p.date, |d| d.max(p.date)));
        min_value = min_value.min(p.value);
        max_value = max_value.max(p.value);
    }

    let (Some(start_date), Some(end_date)) = (min_date, max_date) else {
        return empty_chart();
    };

    let span_days = (end_date - start_date).num_days().max(1) as f64;
    let range = if max_value - min_value > f64::EPSILON {
        max_value - min_value
    } else {
        1.0
    };

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale =
        |date: NaiveDate| MARGIN_LEFT + ((date - start_date).num_days() as f64 / span_days) * plot_width;
    let y_scale = |v: f64| MARGIN_TOP + plot_height - ((v - min_value) / range) * plot_height;

    let mid_date = start_date + (end_date - start_date) / 2;

    let mut svg = String::new();
    svg_open(&mut svg);
    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"15\" font-size=\"12\" fill=\"#666\">{}</text>",
        MARGIN_LEFT,
        escape(y_label)
    );

    // axes
    let _ = writeln!(
        svg,
        "  <line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = CHART_HEIGHT - MARGIN_BOTTOM
    );
    let _ = writeln!(
        svg,
        "  <line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>",
        l = MARGIN_LEFT,
        b = CHART_HEIGHT - MARGIN_BOTTOM,
        r = CHART_WIDTH - MARGIN_RIGHT
    );

    for (value, y) in [
        (max_value, MARGIN_TOP + 5.0),
        ((max_value + min_value) / 2.0, MARGIN_TOP + plot_height / 2.0),
        (min_value, CHART_HEIGHT - MARGIN_BOTTOM - 5.0),
    ] {
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>",
            MARGIN_LEFT - 5.0,
            y,
            format_axis_value(value)
        );
    }

    for (date, x) in [
        (start_date, MARGIN_LEFT),
        (mid_date, MARGIN_LEFT + plot_width / 2.0),
        (end_date, CHART_WIDTH - MARGIN_RIGHT),
    ] {
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>",
            x,
            CHART_HEIGHT - MARGIN_BOTTOM + 15.0,
            date
        );
    }

    for (i, line) in series.iter().enumerate() {
        let color = series_color(i);
        if !line.points.is_empty() {
            let mut path_data = String::new();
            for (j, point) in line.points.iter().enumerate() {
                let cmd = if j == 0 { "M" } else { " L" };
                let _ = write!(
                    path_data,
                    "{} {:.1} {:.1}",
                    cmd,
                    x_scale(point.date),
                    y_scale(point.value)
                );
            }
            let _ = writeln!(
                svg,
                "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"><title>{}</title></path>",
                path_data,
                color,
                escape(&line.symbol)
            );
        }

        let legend_x = CHART_WIDTH - MARGIN_RIGHT + 10.0;
        let legend_y = MARGIN_TOP + i as f64 * LEGEND_ROW;
        let _ = writeln!(
            svg,
            "  <rect x=\"{}\" y=\"{}\" width=\"10\" height=\"10\" fill=\"{}\"/>",
            legend_x,
            legend_y,
            color
        );
        let _ = writeln!(
            svg,
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#333\">{}</text>",
            legend_x + 14.0,
            legend_y + 9.0,
            escape(&line.symbol)
        );
    }

    svg.push_str("</svg>\n");
    svg
}
