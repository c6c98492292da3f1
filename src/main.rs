//! marketplace-gateway server entry point.
//!
//! Starts the Axum HTTP server. The indexer database is optional: when
//! it is not configured or unreachable at startup, the process still
//! serves, answering everything from the chain-RPC fallback.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use marketplace_gateway::api;
use marketplace_gateway::app_state::AppState;
use marketplace_gateway::config::GatewayConfig;
use marketplace_gateway::persistence::EventStore;
use marketplace_gateway::rpc::ChainClient;
use marketplace_gateway::service::QueryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting marketplace-gateway");

    // Connect the indexer adapter. Failure degrades to RPC-only serving
    // rather than aborting startup.
    let store = match &config.indexer_db_url {
        Some(url) => match EventStore::connect(url, &config).await {
            Ok(store) => {
                tracing::info!("indexer database connected");
                Some(store)
            }
            Err(error) => {
                tracing::warn!(%error, "indexer database unreachable, serving rpc-only");
                None
            }
        },
        None => {
            tracing::info!("no indexer database configured, serving rpc-only");
            None
        }
    };

    let chain = ChainClient::new(&config);
    let query = Arc::new(QueryService::new(store.clone(), chain, config.clone()));
    let app_state = AppState { query };

    // 408 on request timeout is the intended behavior here.
    #[allow(deprecated)]
    let timeout_layer = TimeoutLayer::new(Duration::from_secs(30));

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(timeout_layer)
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = store {
        store.close().await;
    }
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to install ctrl-c handler");
    }
}
