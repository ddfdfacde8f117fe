//! Honeycomb account service HTTP API
//!
//! Exposes account registration, lookup, deletion and login over JSON/HTTP.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use crate::config::{ServerSettings, SettingsError, StoreBackend};
pub use error::*;
pub use state::AppState;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
///
/// # Errors
///
/// `SettingsError::Invalid` if the configured CORS origins are rejected.
pub fn create_app(state: AppState, settings: &ServerSettings) -> Result<Router, SettingsError> {
    let cors = middleware::create_cors_layer(&settings.cors_allowed_origins)?;

    Ok(routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(state))
}
