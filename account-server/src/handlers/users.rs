//! `/user` handlers

use account_identity::{AccountView, CreateAccountRequest, LoginRequest, LoginResponse};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::{ApiError, MessageResponse},
    state::AppState,
};

type ApiResult<T> = Result<T, ApiError>;

/// `GET /user/all`
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Response> {
    let accounts = state.accounts.list_accounts().await?;
    if accounts.is_empty() {
        return Ok(Json(MessageResponse::new("No users found")).into_response());
    }
    Ok(Json(accounts).into_response())
}

/// `GET /user/:id`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AccountView>> {
    let account = state.accounts.get_account(&id).await?;
    Ok(Json(account))
}

/// `POST /user`
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AccountView>)> {
    let Json(request) = payload?;
    let account = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// `DELETE /user/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.accounts.delete_account(&id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

/// `POST /user/login`
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let response = state.accounts.login(request).await?;
    Ok(Json(response))
}
