use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{health, users},
    state::AppState,
};

/// Create health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}

/// Create account routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(users::create_user))
        .route("/user/all", get(users::list_users))
        .route("/user/login", post(users::login))
        .route("/user/:id", get(users::get_user).delete(users::delete_user))
}

pub fn create_routes() -> Router<AppState> {
    Router::new().merge(health_routes()).merge(user_routes())
}
