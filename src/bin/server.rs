//! capital-explorer HTTP server binary.
//!
//! Starts an axum HTTP server exposing the `capital` tool and the read
//! endpoints.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 3000)
//! - `CAPITALS_DATASET` - JSON dataset path (default: embedded dataset)
//! - `UNSPLASH_ACCESS_KEY` - enables photo enrichment
//! - `ENRICHMENT_ENABLED` - `false` to serve base data only
//! - `RUST_LOG` - Tracing filter (default: "info,capital_explorer=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use capital_explorer::server::{app_router, AppState};
use capital_explorer::ExplorerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,capital_explorer=debug".into()),
        )
        .init();

    let config = ExplorerConfig::from_env().context("invalid configuration")?;
    let bind_addr = format!("0.0.0.0:{}", config.port);

    let state = AppState::from_config(&config).context("failed to load capital data")?;
    tracing::info!("Loaded {} capitals", state.gateway.roster().len());

    let app = app_router(state);

    tracing::info!("capital-explorer server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health         - liveness probe");
    tracing::info!("  GET  /capital/:code  - capital record");
    tracing::info!("  POST /tools/capital  - tool invocation");
    tracing::info!("  POST /mcp            - MCP JSON-RPC");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
