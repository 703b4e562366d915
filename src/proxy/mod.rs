use axum::http::Method;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::error::AppError;

mod client;
pub use client::{
    outbound_headers, UpstreamClient, UpstreamReply, FORM_CONTENT_TYPE, USER_AGENT,
};

/// Paths starting with this are relayed upstream, everything else is static.
pub const API_PREFIX: &str = "/api/";

/// Returns the part of `path_and_query` after the API prefix, query string
/// included. No decoding or normalisation happens here.
pub fn api_sub_path(path_and_query: &str) -> Option<&str> {
    path_and_query.strip_prefix(API_PREFIX)
}

/// `None` for an empty body; otherwise the body must be JSON.
pub fn parse_inbound_body(body: &[u8]) -> Result<Option<Value>, AppError> {
    if body.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

/// The upstream wants JSON wrapped in a single `data` form field.
pub fn encode_form_body(value: &Value) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("data", &value.to_string())
        .finish()
}

/// Runs one relay: validate and re-encode the body, then forward it. Nothing
/// is sent upstream when the body is rejected.
pub async fn relay(
    upstream: &UpstreamClient,
    method: Method,
    sub_path: &str,
    body: &[u8],
) -> Result<UpstreamReply, AppError> {
    let form = parse_inbound_body(body)?.map(|value| encode_form_body(&value));
    debug!(
        sub_path = sub_path,
        form_bytes = form.as_ref().map_or(0, String::len),
        "Prepared upstream body"
    );

    upstream.forward(method, sub_path, form).await
}
