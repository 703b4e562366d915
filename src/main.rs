use ecoledirecte_proxy::{
    build_router,
    config::{AppConfig, LogFormat},
    AppState,
};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Compact);
            error!("{}", e);
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    debug!(
        "Configuration loaded: host={}, port={}, upstream={}, static_root={}, timeout={:?}",
        config.host,
        config.port,
        config.upstream_base_url,
        config.static_root.display(),
        config.upstream_timeout
    );

    let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
    let state = AppState::new(config)?;
    let app = build_router(state);

    let local = listener.local_addr()?;
    info!("EcoleDirecte proxy started");
    info!("  Application: http://{}", local);
    info!("  API proxy:   http://{}/api/", local);
    info!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            debug!("CTRL+C signal received");
        },
        _ = terminate => {
            debug!("Terminate signal received");
        },
    }
    info!("Shutdown signal received, no longer accepting connections");
}
