//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Response},
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::adapters::chart_svg::render_line_chart;
use crate::domain::config_validation::DATE_FORMAT;
use crate::domain::presentation::{STATS_HEADERS, StatsRow, stats_rows};
use crate::domain::view::{ChartSeries, Mode, Selection, SelectionState, ViewSelector};

use super::templates::{
    BasePage, DashboardTemplate, ErrorTemplate, SelectionTemplate, SymbolOption, render,
};
use super::{ApiError, AppState, WebError, is_htmx_request};

/// Query parameters of a view request.
///
/// `symbols` may repeat (one per checked box) or hold a comma-separated list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewRequest {
    pub mode: Option<String>,
    pub symbols: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl ViewRequest {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut request = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "mode" => request.mode = Some(value),
                "symbols" => request.symbols.extend(
                    value
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty()),
                ),
                "start" => request.start = Some(value),
                "end" => request.end = Some(value),
                _ => {}
            }
        }
        request
    }
}

fn parse_date(value: Option<&str>, default: NaiveDate, name: &str) -> Result<NaiveDate, WebError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map_err(|_| WebError::bad_request(format!("invalid {name} date '{s}', expected YYYY-MM-DD"))),
    }
}

fn request_mode(state: &AppState, request: &ViewRequest) -> Mode {
    match &request.mode {
        Some(choice) => Mode::from_choice(choice, &request.symbols),
        None => state.default_mode.clone(),
    }
}

fn resolve(state: &AppState, request: &ViewRequest) -> Result<(Mode, NaiveDate, NaiveDate), WebError> {
    let mode = request_mode(state, request);
    let start = parse_date(request.start.as_deref(), state.default_start, "start")?;
    let end = parse_date(request.end.as_deref(), state.default_end, "end")?;
    Ok((mode, start, end))
}

/// Form values for a request that failed; unparseable dates fall back to defaults.
fn form_values(state: &AppState, request: &ViewRequest) -> (Mode, NaiveDate, NaiveDate) {
    let mode = request_mode(state, request);
    let start = parse_date(request.start.as_deref(), state.default_start, "start")
        .unwrap_or(state.default_start);
    let end =
        parse_date(request.end.as_deref(), state.default_end, "end").unwrap_or(state.default_end);
    (mode, start, end)
}

fn select(state: &AppState, request: &ViewRequest) -> Result<(Mode, NaiveDate, NaiveDate, Selection), WebError> {
    let (mode, start, end) = resolve(state, request)?;
    debug!(mode = mode.choice(), %start, %end, "view request");
    let selection = ViewSelector::new(&state.market)
        .with_scope(state.scope)
        .select(&mode, start, end)?;
    Ok((mode, start, end, selection))
}

fn selection_fragment(selection: &Selection) -> Result<String, WebError> {
    let chart_svg = render_line_chart(&selection.chart, selection.y_label);
    let rows = stats_rows(&selection.stats);
    render(&SelectionTemplate {
        title: &selection.title,
        chart_svg: &chart_svg,
        headers: &STATS_HEADERS,
        rows: &rows,
    })
}

fn error_fragment(error: &WebError) -> Result<String, WebError> {
    render(&ErrorTemplate {
        status: error.status.as_u16(),
        message: &error.message,
    })
}

fn symbol_options(state: &AppState, mode: &Mode) -> Vec<SymbolOption> {
    state
        .market
        .symbols()
        .iter()
        .map(|symbol| SymbolOption {
            symbol: symbol.clone(),
            selected: matches!(mode, Mode::Single(s) if s == symbol),
            checked: matches!(mode, Mode::Custom(set) if set.contains(symbol)),
        })
        .collect()
}

fn full_page(
    state: &AppState,
    mode: &Mode,
    start: NaiveDate,
    end: NaiveDate,
    selection_html: &str,
) -> Result<String, WebError> {
    let (min_date, max_date) = state
        .market
        .full_range()
        .unwrap_or((state.default_start, state.default_end));
    let options = symbol_options(state, mode);
    let state_kind = mode.state();
    let content = render(&DashboardTemplate {
        options: &options,
        all_selected: state_kind == SelectionState::All,
        custom_selected: matches!(
            state_kind,
            SelectionState::CustomEmpty | SelectionState::CustomNonEmpty
        ),
        start_date: start,
        end_date: end,
        min_date,
        max_date,
        selection_html,
    })?;
    render(&BasePage {
        title: "Dashboard",
        content: &content,
    })
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    let (mode, start, end, selection) = select(&state, &ViewRequest::default())?;
    let fragment = selection_fragment(&selection)?;
    Ok(Html(full_page(&state, &mode, start, end, &fragment)?))
}

pub async fn view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let request = ViewRequest::from_pairs(pairs);
    let htmx = is_htmx_request(&headers);

    let result = select(&state, &request);
    if htmx {
        return Ok(match result {
            Ok((_, _, _, selection)) => Html(selection_fragment(&selection)?).into_response(),
            Err(e) => (e.status, Html(error_fragment(&e)?)).into_response(),
        });
    }

    match result {
        Ok((mode, start, end, selection)) => {
            let fragment = selection_fragment(&selection)?;
            Ok(Html(full_page(&state, &mode, start, end, &fragment)?).into_response())
        }
        Err(e) => {
            // keep the controls so the user can correct the request
            let (mode, start, end) = form_values(&state, &request);
            let page = full_page(&state, &mode, start, end, &error_fragment(&e)?)?;
            Ok((e.status, Html(page)).into_response())
        }
    }
}

pub async fn chart_svg(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let (_, _, _, selection) = select(&state, &ViewRequest::from_pairs(pairs))?;
    let svg = render_line_chart(&selection.chart, selection.y_label);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[derive(Debug, serde::Serialize)]
pub struct SelectionBody {
    pub state: SelectionState,
    pub title: String,
    pub y_label: &'static str,
    pub chart: ChartSeries,
    pub stats: Vec<StatsRow>,
}

impl From<Selection> for SelectionBody {
    fn from(selection: Selection) -> Self {
        let stats = stats_rows(&selection.stats);
        Self {
            state: selection.state,
            title: selection.title,
            y_label: selection.y_label,
            chart: selection.chart,
            stats,
        }
    }
}

pub async fn api_selection(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SelectionBody>, ApiError> {
    let (_, _, _, selection) = select(&state, &ViewRequest::from_pairs(pairs))?;
    Ok(Json(selection.into()))
}

/// Full-history statistics for every loaded asset.
pub async fn api_stats(State(state): State<Arc<AppState>>) -> Json<Vec<StatsRow>> {
    Json(stats_rows(state.market.stats()))
}

pub async fn not_found() -> WebError {
    WebError::not_found("page not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn view_request_collects_repeated_and_comma_symbols() {
        let request = ViewRequest::from_pairs(pairs(&[
            ("mode", "custom"),
            ("symbols", "SPY"),
            ("symbols", "tlt, gld"),
            ("start", "2024-01-01"),
            ("ignored", "x"),
        ]));
        assert_eq!(request.mode.as_deref(), Some("custom"));
        assert_eq!(request.symbols, vec!["SPY", "tlt", "gld"]);
        assert_eq!(request.start.as_deref(), Some("2024-01-01"));
        assert_eq!(request.end, None);
    }

    #[test]
    fn parse_date_defaults_when_blank() {
        let default = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date(None, default, "start").unwrap(), default);
        assert_eq!(parse_date(Some(" "), default, "start").unwrap(), default);
        let err = parse_date(Some("01/02/2024"), default, "end").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
