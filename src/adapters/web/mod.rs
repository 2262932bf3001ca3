//! Web server adapter.
//!
//! Axum server with an HTMX frontend: the dashboard form swaps the
//! selection fragment in place, and the same selection is available as
//! JSON and as a standalone SVG chart.

mod error;
mod handlers;
mod templates;

pub use error::{ApiError, WebError};
pub use handlers::*;
pub use templates::*;

use axum::{Router, routing::get};
use chrono::NaiveDate;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::domain::market::MarketData;
use crate::domain::view::{Mode, StatsScope};

pub struct AppState {
    pub market: Arc<MarketData>,
    pub scope: StatsScope,
    pub default_mode: Mode,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl AppState {
    /// State spanning the full loaded history, showing every asset.
    pub fn new(market: Arc<MarketData>, scope: StatsScope) -> Option<Self> {
        let (default_start, default_end) = market.full_range()?;
        Some(Self {
            market,
            scope,
            default_mode: Mode::All,
            default_start,
            default_end,
        })
    }

    pub fn with_default_mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_default_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.default_start = start;
        self.default_end = end;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/view", get(handlers::view))
        .route("/chart.svg", get(handlers::chart_svg))
        .route("/api/selection", get(handlers::api_selection))
        .route("/api/stats", get(handlers::api_stats))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
