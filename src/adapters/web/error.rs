//! HTTP error responses for web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::{EtfStatsError, StatsError};

use super::templates::{BasePage, ErrorTemplate, render};

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_stats_error(err: &StatsError) -> StatusCode {
    match err {
        StatsError::UnknownSymbol(_) => StatusCode::BAD_REQUEST,
        StatsError::EmptyRange { .. }
        | StatsError::InsufficientData { .. }
        | StatsError::DivisionByZero { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl From<StatsError> for WebError {
    fn from(err: StatsError) -> Self {
        Self::new(status_from_stats_error(&err), err.to_string())
    }
}

impl From<EtfStatsError> for WebError {
    fn from(err: EtfStatsError) -> Self {
        match err {
            EtfStatsError::Stats(e) => e.into(),
            EtfStatsError::ConfigMissing { .. }
            | EtfStatsError::ConfigInvalid { .. }
            | EtfStatsError::ConfigParse { .. } => Self::bad_request(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        let content = match render(&template) {
            Ok(html) => html,
            Err(_) => return (self.status, self.message).into_response(),
        };
        let page = BasePage {
            title: "Error",
            content: &content,
        };
        match render(&page) {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, Html(content)).into_response(),
        }
    }
}

/// Errors from the JSON endpoints, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub WebError);

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl From<WebError> for ApiError {
    fn from(err: WebError) -> Self {
        Self(err)
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.0.message,
        };
        (self.0.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unknown_symbol_is_bad_request() {
        let err: WebError = StatsError::UnknownSymbol("QQQ".into()).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "unknown symbol: QQQ");
    }

    #[test]
    fn empty_range_is_unprocessable() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err: WebError = EtfStatsError::from(StatsError::EmptyRange {
            start: day,
            end: day,
        })
        .into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn source_errors_are_internal() {
        let err: WebError = EtfStatsError::DataSource {
            reason: "gone".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
