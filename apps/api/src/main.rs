mod config;
mod errors;
mod patterns;
mod routes;
mod state;
mod status;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::patterns::encryption::SimulatedFheEncryptor;
use crate::patterns::repository::PatternRepository;
use crate::routes::build_router;
use crate::state::AppState;
use crate::status::TransactionStatusMachine;
use crate::store::connect_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing backend settings)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Pattern API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the remote store
    let store = connect_store(&config).await?;
    info!(
        "Store backend: {} (timeout {:?})",
        config.store_backend.as_str(),
        config.store_timeout
    );

    // Swap the encryptor here once a real FHE client is available.
    let repository = Arc::new(PatternRepository::new(
        store,
        Arc::new(SimulatedFheEncryptor),
    ));

    let status = TransactionStatusMachine::new(config.success_dismiss, config.error_dismiss);

    // Log every status transition the banner would show
    let mut status_rx = status.subscribe();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let current = status_rx.borrow_and_update().clone();
            info!("Transaction status: {:?} {}", current.state, current.message);
        }
    });

    // Build app state
    let state = AppState {
        repository,
        status,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the web frontend host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
