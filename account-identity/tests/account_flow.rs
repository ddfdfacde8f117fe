//! End-to-end account flows against the in-memory store

use account_identity::{
    AccountService, AccountStore, CreateAccountRequest, IdentityConfig, IdentityError,
    LoginRequest, MemoryAccountStore, PasswordParams,
};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use std::sync::Arc;

fn config() -> IdentityConfig {
    IdentityConfig {
        password_hashing: PasswordParams {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        },
        ..IdentityConfig::default()
    }
}

fn setup() -> (Arc<MemoryAccountStore>, Arc<AccountService>) {
    let store = Arc::new(MemoryAccountStore::new());
    let service = AccountService::from_config(
        store.clone(),
        &SecretString::new("integration-secret".to_string()),
        config(),
    )
    .unwrap();
    (store, Arc::new(service))
}

fn register_request(email: &str, password: &str) -> CreateAccountRequest {
    CreateAccountRequest {
        first_name: Some("Grace".to_string()),
        last_name: Some("Hopper".to_string()),
        email: email.to_string(),
        password: SecretString::new(password.to_string()),
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: SecretString::new(password.to_string()),
    }
}

#[tokio::test]
async fn test_register_login_and_decode() {
    let (_, service) = setup();

    let view = service
        .register(register_request("grace@navy.mil", "cobol1959"))
        .await
        .unwrap();
    assert_eq!(view.first_name.as_deref(), Some("Grace"));

    let before = Utc::now();
    let response = service
        .login(login_request("grace@navy.mil", "cobol1959"))
        .await
        .unwrap();

    let claims = service.issuer().decode(&response.token).unwrap();
    assert_eq!(claims.account_id().unwrap(), view.id);
    assert_eq!(claims.email, "grace@navy.mil");

    let expected = before + Duration::hours(72);
    let drift = (response.expires_at - expected).num_seconds().abs();
    assert!(drift <= 5, "expiry drifted by {drift}s");
}

#[tokio::test]
async fn test_repeated_logins_accumulate_tokens() {
    let (store, service) = setup();
    let view = service
        .register(register_request("grace@navy.mil", "cobol1959"))
        .await
        .unwrap();

    let mut tokens = Vec::new();
    for _ in 0..4 {
        let response = service
            .login(login_request("grace@navy.mil", "cobol1959"))
            .await
            .unwrap();
        tokens.push(response.token);
    }

    let account = store.find_by_id(view.id).await.unwrap();
    assert_eq!(account.tokens, tokens);

    let listed = service.get_account(&view.id.to_string()).await.unwrap();
    assert_eq!(listed.tokens.len(), 4);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let (_, service) = setup();
    service
        .register(register_request("grace@navy.mil", "cobol1959"))
        .await
        .unwrap();

    let wrong = service
        .login(login_request("grace@navy.mil", "fortran57"))
        .await
        .unwrap_err();
    let unknown = service
        .login(login_request("ada@engine.org", "cobol1959"))
        .await
        .unwrap_err();

    assert!(matches!(wrong, IdentityError::InvalidCredentials));
    assert!(matches!(unknown, IdentityError::InvalidCredentials));
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn test_deleted_account_is_gone() {
    let (store, service) = setup();
    let view = service
        .register(register_request("grace@navy.mil", "cobol1959"))
        .await
        .unwrap();
    let id = view.id.to_string();

    service.delete_account(&id).await.unwrap();

    assert!(matches!(service.get_account(&id).await, Err(IdentityError::NotFound)));
    assert!(store.is_empty());
    assert!(matches!(
        service.login(login_request("grace@navy.mil", "cobol1959")).await,
        Err(IdentityError::InvalidCredentials)
    ));

    // The email can be registered again once the account is removed
    assert!(service
        .register(register_request("grace@navy.mil", "cobol1959"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_registrations_create_one_account() {
    let (store, service) = setup();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .register(register_request("race@honeycomb.dev", "password1"))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, IdentityError::DuplicateEmail)),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.len(), 1);
}
