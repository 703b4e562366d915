use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::error::Error as _;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("{}", describe_upstream(.0))]
    Upstream(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The only error shape clients ever see.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let envelope = ErrorEnvelope {
            code: status.as_u16(),
            message: self.to_string(),
        };

        let mut response = (status, Json(envelope)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}

/// Flattens a reqwest error and its sources into one line, so that the
/// underlying cause (refused connection, DNS failure, ...) is visible.
fn describe_upstream(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "upstream request timed out"
    } else if error.is_connect() {
        "upstream connection failed"
    } else {
        "upstream request failed"
    };

    let mut message = format!("{}: {}", kind, error);
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
