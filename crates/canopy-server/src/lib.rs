//! HTTP admin gateway for the Canopy content engine.
//!
//! This crate provides a native Rust HTTP server using axum, serving the
//! uniform content API consumed by the admin console and the public
//! rendering layer:
//!
//! - Entity/section/item CRUD per content kind
//! - Visibility toggles, reordering, duplication, cascade deletion
//! - Nested tree reads in admin (`?all=true`) or public (pruned) view
//!
//! The gateway validates request shape (required fields, type-tag
//! vocabulary) and delegates everything else to
//! [`ContentEngine`](canopy_engine::ContentEngine); it holds no business
//! logic of its own. Authentication is a front-proxy concern: every request
//! reaching this server is assumed to be authorized.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use canopy_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_string(),
//!         port: 8686,
//!         database: PathBuf::from("canopy.db"),
//!         version: "1.0.0".to_string(),
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use canopy_engine::ContentEngine;
use canopy_store::{ContentStore, SqliteStore};
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// SQLite database file.
    pub database: PathBuf,
    /// Application version (for ETag computation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8686,
            database: PathBuf::from("canopy.db"),
            version: String::new(),
        }
    }
}

/// Run the server.
///
/// Opens (or creates) the database, applies the schema, and serves until
/// Ctrl-C.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Open storage and make sure the schema exists
    let store = SqliteStore::connect(&config.database).await?;
    store.migrate().await?;

    // Create the engine and app state
    let engine = Arc::new(ContentEngine::new(
        Arc::new(store) as Arc<dyn ContentStore>
    ));
    let state = Arc::new(AppState {
        engine,
        version: config.version.clone(),
    });

    // Create router
    let app = app::create_router(state);

    // Bind and run server
    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, database = %config.database.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Canopy config.
///
/// # Arguments
///
/// * `config` - Canopy configuration
/// * `version` - Application version
#[must_use]
pub fn server_config_from_config(config: &canopy_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        database: config.database_resolved.path.clone(),
        version,
    }
}
