use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use registration::config::AppConfig;
use registration::web::{self, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Configuration and storage directories
    let config = AppConfig::from_env();
    info!(
        "students file: {}, uploads: {}",
        config.students_csv.display(),
        config.upload_dir.display()
    );

    let state = AppState::new(config.clone());
    if let Err(e) = state.photo_store().ensure_dirs() {
        error!("Cannot create upload directories: {}", e);
        std::process::exit(1);
    }
    // A corrupt students file is reported at startup but does not stop the
    // server: every page reports it again until the file is fixed.
    if let Err(e) = state.record_store().load() {
        warn!("Students file cannot be read: {}", e);
    }

    let app = web::router(state);

    // 3. Bind (with fallback port)
    let addr = match format!("{}:{}", config.host, config.port).parse::<SocketAddr>() {
        Ok(a) => a,
        Err(e) => {
            error!("Invalid HOST/PORT {}:{}: {}", config.host, config.port, e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback = SocketAddr::new(addr.ip(), addr.port().saturating_add(1));
            warn!("Could not bind {}: {}. Trying fallback {}", addr, e, fallback);
            match tokio::net::TcpListener::bind(fallback).await {
                Ok(l) => l,
                Err(e) => {
                    error!("Could not bind fallback {}: {}", fallback, e);
                    std::process::exit(1);
                }
            }
        }
    };

    match listener.local_addr() {
        Ok(bound) => info!("Serving on http://{}", bound),
        Err(e) => warn!("Serving, but the bound address is unknown: {}", e),
    }

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
