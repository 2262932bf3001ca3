#![cfg(feature = "web")]
//! Web handler integration tests.
//!
//! Tests cover:
//! - Dashboard renders the controls and the default selection
//! - HTMX fragment vs full page responses on /view
//! - Error statuses for unknown symbols, bad dates and empty ranges
//! - SVG chart and JSON endpoints

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use etfstats::adapters::web::{AppState, build_router};
use etfstats::domain::view::StatsScope;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use common::*;

fn create_test_app() -> Router {
    let state = AppState::new(Arc::new(sample_market()), StatsScope::FullHistory).unwrap();
    build_router(state)
}

async fn get(uri: &str, htmx: bool) -> (StatusCode, Option<String>, String) {
    let mut request = Request::builder().uri(uri);
    if htmx {
        request = request.header("HX-Request", "true");
    }
    let response = create_test_app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8_lossy(&body).to_string())
}

mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn dashboard_renders_with_ok_status() {
        let (status, _, _) = get("/", false).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_contains_controls() {
        let (_, _, html) = get("/", false).await;
        assert!(html.contains("<html"));
        assert!(html.contains("name=\"mode\""));
        assert!(html.contains("name=\"start\" value=\"2024-01-01\""));
        assert!(html.contains("name=\"end\" value=\"2024-01-30\""));
        assert!(html.contains("value=\"GLD\""));
        assert!(html.contains("hx-get=\"/view\""));
        assert!(html.contains("Build your chart"));
    }

    #[tokio::test]
    async fn dashboard_shows_all_assets_by_default() {
        let (_, _, html) = get("/", false).await;
        assert!(html.contains("Normalized Performance of All Assets"));
        assert!(html.contains("<th>Sharpe Ratio</th>"));
        assert!(html.contains("<td>TLT</td>"));
    }

    #[tokio::test]
    async fn checklist_hidden_unless_building_a_chart() {
        let (_, _, html) = get("/", false).await;
        assert!(html.contains("id=\"checklist\" class=\"checklist\" hidden>"));

        let (_, _, html) = get("/view?mode=custom&symbols=SPY", false).await;
        assert!(html.contains("id=\"checklist\" class=\"checklist\">"));
    }
}

mod view_tests {
    use super::*;

    #[tokio::test]
    async fn htmx_request_gets_fragment() {
        let (status, _, html) = get("/view?mode=SPY", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!html.contains("<html"));
        assert!(html.contains("Asset Performance: SPY"));
        assert!(html.contains("<svg"));
    }

    #[tokio::test]
    async fn plain_request_gets_full_page_with_selection() {
        let (status, _, html) = get("/view?mode=spy", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<html"));
        assert!(html.contains("<option value=\"SPY\" selected>"));
    }

    #[tokio::test]
    async fn custom_checklist_with_repeated_symbols() {
        let (_, _, html) = get("/view?mode=custom&symbols=GLD&symbols=TLT", false).await;
        assert!(html.contains("Normalized Performance of Selected Assets"));
        assert!(html.contains("value=\"GLD\" checked"));
        assert!(html.contains("value=\"TLT\" checked"));
        assert!(!html.contains("<td>SPY</td>"));
    }

    #[tokio::test]
    async fn empty_custom_selection_prompts_for_assets() {
        let (status, _, html) = get("/view?mode=custom", true).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Select assets to build your chart"));
    }

    #[tokio::test]
    async fn unknown_symbol_is_bad_request() {
        let (status, _, html) = get("/view?mode=QQQ", true).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("unknown symbol: QQQ"));
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let (status, _, _) = get("/view?start=2024-13-01", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn range_after_data_is_unprocessable() {
        let (status, _, html) = get("/view?start=2025-01-01&end=2025-02-01", false).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("no price rows between"));
    }

    #[tokio::test]
    async fn failed_full_page_keeps_the_controls() {
        let (status, _, html) = get("/view?mode=SPY&start=2025-01-01&end=2025-02-01", false).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(html.contains("hx-get=\"/view\""));
        assert!(html.contains("<option value=\"SPY\" selected>"));
        assert!(html.contains("name=\"start\" value=\"2025-01-01\""));
        assert!(html.contains("<div class=\"error\">"));

        let (status, _, html) = get("/view?mode=QQQ&start=bad", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("name=\"start\" value=\"2024-01-01\""));
        assert!(html.contains("Build your chart"));
    }
}

mod chart_and_api_tests {
    use super::*;

    #[tokio::test]
    async fn chart_endpoint_returns_svg() {
        let (status, content_type, body) =
            get("/chart.svg?mode=custom&symbols=SPY,GLD&start=2024-01-05", false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
        assert!(body.starts_with("<svg"));
        assert_eq!(body.matches("<path").count(), 2);
    }

    #[tokio::test]
    async fn api_selection_returns_json() {
        let (status, _, body) = get("/api/selection?mode=TLT", false).await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["state"], "single");
        assert_eq!(json["y_label"], "Price");
        assert_eq!(json["chart"][0]["symbol"], "TLT");
        assert_eq!(json["chart"][0]["points"][0]["date"], "2024-01-01");
        assert_eq!(json["stats"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn api_selection_error_is_json() {
        let (status, _, body) = get("/api/selection?mode=QQQ", false).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "unknown symbol: QQQ");
    }

    #[tokio::test]
    async fn api_stats_lists_every_asset() {
        let (status, _, body) = get("/api/stats", false).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let symbols: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["symbol"].as_str().unwrap())
            .collect();
        assert_eq!(symbols, vec!["SPY", "TLT", "GLD"]);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (status, _, _) = get("/no-such-page", false).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
