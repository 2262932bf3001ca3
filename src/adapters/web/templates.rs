//! HTML templates using Askama.

use askama::Template;
use chrono::NaiveDate;

use crate::domain::presentation::StatsRow;

use super::WebError;

pub fn render<T: Template>(template: &T) -> Result<String, WebError> {
    template
        .render()
        .map_err(|e| WebError::internal(format!("template error: {e}")))
}

#[derive(Template)]
#[template(path = "base.html")]
pub struct BasePage<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// One entry of the asset dropdown and checklist.
pub struct SymbolOption {
    pub symbol: String,
    pub selected: bool,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub options: &'a [SymbolOption],
    pub all_selected: bool,
    pub custom_selected: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub selection_html: &'a str,
}

#[derive(Template)]
#[template(path = "selection.html")]
pub struct SelectionTemplate<'a> {
    pub title: &'a str,
    pub chart_svg: &'a str,
    pub headers: &'a [&'a str],
    pub rows: &'a [StatsRow],
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub status: u16,
    pub message: &'a str,
}
