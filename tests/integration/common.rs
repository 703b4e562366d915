use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use ecoledirecte_proxy::{build_router, config::AppConfig, AppState};
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;

/// One request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A programmable stand-in for the remote API.
pub struct MockUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockUpstream {
    /// Every request is answered with `status`, `content_type` and `reply`.
    pub async fn start(status: u16, content_type: &'static str, reply: &'static str) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let status = StatusCode::from_u16(status).unwrap();

        let app = Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(CapturedRequest {
                        method,
                        uri,
                        headers,
                        body,
                    });
                    (status, [("content-type", content_type)], reply).into_response()
                }
            },
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, captured }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/v3/", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }
}

/// Returns an address nothing is listening on.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v3/", addr)
}

/// Accepts connections and never writes a byte back.
pub async fn silent_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}/v3/", addr)
}

pub fn test_config(upstream_base_url: String, static_root: PathBuf) -> AppConfig {
    AppConfig {
        port: 0,
        upstream_base_url,
        static_root,
        ..AppConfig::default()
    }
}

/// Starts the proxy on an ephemeral port and returns its base URL.
pub async fn spawn_proxy(config: AppConfig) -> String {
    let app = build_router(AppState::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
