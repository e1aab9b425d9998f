//! Customer Services Gateway - Main Application Entry Point
//!
//! A web front end for the banking backend. It serves HTML forms for account
//! and customer operations, turns each submission into one JSON call to the
//! backend, and renders the backend's answer (or the reason it failed) back
//! into the page.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Backend Client**: reqwest, one call per submission, bounded by a timeout
//! - **Pages**: minijinja templates compiled into the binary
//! - **Format**: urlencoded forms in, commarea-style JSON to and from the backend
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the backend HTTP client
//! 3. Compile page templates
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

mod config;
mod error;
mod handlers;
mod models;
mod routes;
mod services;
mod views;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{routes::AppState, services::gateway::Gateway, views::Views};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Backend client
    let gateway = Gateway::new(&config.backend_base()?, config.request_timeout())?;
    tracing::info!(
        backend = %config.backend_url,
        timeout_secs = config.request_timeout_secs,
        "Backend gateway ready"
    );

    let views = Views::new()?;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState {
        gateway,
        views: Arc::new(views),
        config: Arc::new(config),
    };
    let app = routes::router(state);

    // Bind to network address and start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
