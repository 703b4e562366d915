use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    error::AppError,
    proxy::{self, api_sub_path},
    AppState,
};

pub async fn proxy_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    // axum routes HEAD alongside GET; only GET and POST are relayed.
    if method != Method::GET && method != Method::POST {
        warn!(method = %method, path = %uri.path(), "Method not relayed");
        return method_not_allowed();
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    // Routed here only for `/api/...`, so the prefix is always present.
    let sub_path = api_sub_path(path_and_query).unwrap_or_default();

    let result = async {
        let body = read_body(&headers, body, state.config.max_body_bytes).await?;
        proxy::relay(&state.upstream, method.clone(), sub_path, &body).await
    }
    .await;

    match result {
        Ok(reply) => {
            if !reply.status.is_success() {
                warn!(
                    status = reply.status.as_u16(),
                    sub_path = sub_path,
                    "Upstream returned a non-success status, relaying as 200"
                );
            }
            json_response(reply.body)
        }
        Err(e) => {
            error!(method = %method, sub_path = sub_path, error = %e, "Proxy error");
            e.into_response()
        }
    }
}

/// The body is only read when `Content-Length` announces a positive size.
async fn read_body(headers: &HeaderMap, body: Body, limit: usize) -> Result<Bytes, AppError> {
    let announced = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);

    if announced == 0 {
        return Ok(Bytes::new());
    }
    Ok(to_bytes(body, limit).await?)
}

fn json_response(body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

fn method_not_allowed() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::METHOD_NOT_ALLOWED;
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("GET,POST"));
    response
}
