use std::sync::Arc;

use account_identity::{AccountService, IdentityConfig, MemoryAccountStore, PasswordParams};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tower::ServiceExt;

use account_server::{create_app, AppState, ServerSettings};

const SECRET: &str = "route-test-secret";

fn app() -> (Router, Arc<AccountService>) {
    let identity = IdentityConfig {
        password_hashing: PasswordParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        },
        ..IdentityConfig::default()
    };
    let service = Arc::new(
        AccountService::from_config(
            Arc::new(MemoryAccountStore::new()),
            &SecretString::new(SECRET.to_string()),
            identity,
        )
        .unwrap(),
    );

    let app = create_app(AppState::new(service.clone()), &ServerSettings::default()).unwrap();
    (app, service)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::String(String::from_utf8_lossy(&body).into()))
    };
    (status, value)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/user",
            &json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": password,
            }),
        ),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/user/login",
            &json!({ "email": email, "password": password }),
        ),
    )
    .await
}

#[tokio::test]
async fn test_register_and_login_scenario() {
    let (app, service) = app();

    let (status, body) = register(&app, "a@x.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["first_name"], "Ada");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, body) = login(&app, "a@x.com", "secret123").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert!(body["expires_at"].is_string());

    let claims = service.issuer().decode(token).unwrap();
    assert_eq!(claims.email, "a@x.com");

    let (status, body) = login(&app, "a@x.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
    assert_eq!(body["error_type"], "authentication_error");
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let (app, _) = app();
    register(&app, "a@x.com", "secret123").await;

    let (wrong_status, wrong_body) = login(&app, "a@x.com", "nope-nope").await;
    let (unknown_status, unknown_body) = login(&app, "b@x.com", "secret123").await;

    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["error_type"], unknown_body["error_type"]);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let (app, _) = app();
    let (status, _) = register(&app, "a@x.com", "secret123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = register(&app, "a@x.com", "another123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");
    assert!(body["error_id"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_requests() {
    let (app, _) = app();

    let request = Request::builder()
        .method("POST")
        .uri("/user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");

    let (status, _) = send(
        &app,
        json_request("POST", "/user/login", &json!({ "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = register(&app, "not-an-email", "secret123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_list_users() {
    let (app, _) = app();

    let (status, body) = send(&app, empty_request("GET", "/user/all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No users found" }));

    register(&app, "a@x.com", "secret123").await;
    register(&app, "b@x.com", "secret123").await;

    let (status, body) = send(&app, empty_request("GET", "/user/all")).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|user| user.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_get_and_delete_user() {
    let (app, _) = app();
    let (_, created) = register(&app, "a@x.com", "secret123").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, empty_request("GET", &format!("/user/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");

    let (status, body) = send(&app, empty_request("DELETE", &format!("/user/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User deleted" }));

    let (status, body) = send(&app, empty_request("GET", &format!("/user/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = send(&app, empty_request("DELETE", &format!("/user/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let (app, _) = app();

    let (status, _) = send(&app, empty_request("GET", "/user/64b7f0c2e1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, empty_request("DELETE", "/user/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_tokens_show_up_on_the_account() {
    let (app, _) = app();
    let (_, created) = register(&app, "a@x.com", "secret123").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (_, first) = login(&app, "a@x.com", "secret123").await;
    let (_, second) = login(&app, "a@x.com", "secret123").await;

    let (_, account) = send(&app, empty_request("GET", &format!("/user/{}", id))).await;
    assert_eq!(account["tokens"], json!([first["token"], second["token"]]));
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();
    let (status, body) = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let (app, _) = app();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/user")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
