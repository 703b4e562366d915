use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use tracing::{error, info};

use crate::{config::AppConfig, error::AppError};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// What the upstream answered. The status is only ever logged.
#[derive(Debug)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        // One connection per call, nothing is reused between requests.
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.upstream_base_url.clone(),
        })
    }

    pub fn target_url(&self, sub_path: &str) -> String {
        format!("{}{}", self.base_url, sub_path)
    }

    /// Sends `form` (if any) to `base_url + sub_path` with the fixed header
    /// pair and waits for the complete reply.
    pub async fn forward(
        &self,
        method: Method,
        sub_path: &str,
        form: Option<String>,
    ) -> Result<UpstreamReply, AppError> {
        let url = self.target_url(sub_path);
        info!(method = %method, url = %url, "Forwarding to upstream");

        let mut request = self
            .http
            .request(method.clone(), url.as_str())
            .headers(outbound_headers());
        if let Some(form) = form {
            request = request.body(form);
        }

        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(UpstreamReply { status, body })
        }
        .await;

        match result {
            Ok(reply) => {
                info!(
                    method = %method,
                    url = %url,
                    status = reply.status.as_u16(),
                    bytes = reply.body.len(),
                    "Upstream responded"
                );
                Ok(reply)
            }
            Err(e) => {
                let e = AppError::from(e);
                error!(method = %method, url = %url, error = %e, "Upstream request failed");
                Err(e)
            }
        }
    }
}

/// The complete set of headers sent upstream; nothing from the inbound
/// request is copied.
pub fn outbound_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(2);
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers
}
