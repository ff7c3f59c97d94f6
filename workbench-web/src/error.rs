//! Error types for the web layer

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use workbench_apps::AppError;
use workbench_config::ConfigError;
use workbench_entity::{escape, RenderError};
use workbench_fields::FieldsError;

/// Result type for server setup
pub type Result<T> = std::result::Result<T, WebError>;

/// Errors raised while building or running the server
#[derive(Debug, Error)]
pub enum WebError {
    #[error("unknown theme '{name}'")]
    UnknownTheme { name: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Fields(#[from] FieldsError),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Error body of the JSON routes: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = status_from(err.status_code());
        if status.is_server_error() {
            error!(error = %err, "api request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Failure of an HTML page handler. Rendered as a bare error page.
#[derive(Debug)]
pub struct PageError {
    pub status: StatusCode,
    pub message: String,
}

impl PageError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }
}

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        let status = status_from(err.status_code());
        if status.is_server_error() {
            error!(error = %err, "page request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<RenderError> for PageError {
    fn from(err: RenderError) -> Self {
        error!(error = %err, "render failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Something went wrong while rendering this page.".into(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let reason = self.status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>{status} {reason}</title></head>\
             <body><h1>{status} {reason}</h1><p>{message}</p><p><a href=\"/\">Home</a></p></body></html>",
            status = self.status.as_u16(),
            reason = escape(reason),
            message = escape(&self.message),
        );
        (self.status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_app_error() {
        let err = ApiError::from(AppError::not_found("doctors", "d1"));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "doctors document not found: d1");

        let err = ApiError::from(AppError::InvalidDate {
            value: "soon".into(),
        });
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_page_error_escapes_message() {
        let response = PageError {
            status: StatusCode::NOT_FOUND,
            message: "<script>".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
