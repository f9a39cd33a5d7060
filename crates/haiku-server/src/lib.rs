//! haiku-server: HTTP API for the haiku notes service
//!
//! This crate provides:
//! - REST endpoints for users and their notes
//! - Strict JSON request decoding with client-facing error messages
//! - Identifier validation for every path segment
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request ID generation and propagation
//! - Request tracing and logging
//! - Body size limit and read/write deadlines
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use haiku_server::{AppState, ServerConfig, routes};
//! use haiku_store::{Store, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let store = Store::connect(StoreConfig::from_env()?).await?;
//!     let app = routes::build_app(AppState::new(store, config.clone()));
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use haiku_core;
pub use haiku_store;
