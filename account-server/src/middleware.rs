use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SettingsError;

/// Request timing middleware
pub async fn request_timing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();

    tracing::info!(
        method = %method,
        uri = %uri,
        duration_ms = elapsed.as_millis(),
        status = response.status().as_u16(),
        "Request processed"
    );

    response
}

/// CORS for browser clients: explicit origins with credentials.
///
/// # Errors
///
/// `SettingsError::Invalid` when an origin is not a valid header value or is `*`.
pub fn create_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, SettingsError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            if origin.trim() == "*" {
                return Err(SettingsError::Invalid {
                    key: "cors_allowed_origins",
                    message: "wildcard origin cannot be combined with credentials".to_string(),
                });
            }
            HeaderValue::from_str(origin.trim()).map_err(|e| SettingsError::Invalid {
                key: "cors_allowed_origins",
                message: format!("{}: {}", origin, e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]))
}
