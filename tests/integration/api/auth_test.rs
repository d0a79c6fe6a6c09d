//! Authentication API integration tests
//!
//! Tests for login, role-specific registration and the sign-up flow.

use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use ridedash::client::{
    AuthError, AuthService, FileSessionStorage, SessionStore, SignInForm, SignUpForm,
};
use ridedash::shared::error::ApiError;
use ridedash::shared::user::Role;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::MockBackend;

fn sign_up_form(role: Role) -> SignUpForm {
    SignUpForm {
        username: "dana".to_string(),
        email: "dana@example.com".to_string(),
        firstname: "Dana".to_string(),
        lastname: "Driver".to_string(),
        password: "secret123".to_string(),
        password2: "secret123".to_string(),
        role,
    }
}

fn auth_service(backend: &MockBackend) -> AuthService {
    AuthService::new(Arc::new(backend.client.clone()), backend.session.clone())
}

#[tokio::test]
async fn test_sign_in_success() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .and(body_json(json!({"username": "dana", "password": "secret123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "abc",
            "id": 9,
            "name": "Dana Driver",
            "email": "dana@example.com",
            "role": "driver"
        })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let service = auth_service(&backend);
    let identity = service
        .sign_in(&SignInForm {
            username: " dana ".to_string(),
            password: "secret123".to_string(),
            role: Role::Passenger,
        })
        .await
        .unwrap();

    assert_eq!(identity.id, "9");
    assert_eq!(identity.role, Role::Driver);
    assert_eq!(backend.session.token().as_deref(), Some("abc"));
    assert_eq!(backend.session.role(), Some(Role::Driver));
}

#[tokio::test]
async fn test_sign_in_with_unwritable_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, "not a directory").unwrap();
    let session = SessionStore::restore(FileSessionStorage::new(blocker.join("session.json")));
    let backend = MockBackend::start_with(session.clone()).await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&backend.server)
        .await;

    let result = auth_service(&backend)
        .sign_in(&SignInForm {
            username: "dana".to_string(),
            password: "secret123".to_string(),
            role: Role::Driver,
        })
        .await;

    // Signed in for this run only
    assert_matches!(result, Ok(identity) if identity.role == Role::Driver);
    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_sign_in_token_only_response_uses_form() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&backend.server)
        .await;

    let identity = auth_service(&backend)
        .sign_in(&SignInForm {
            username: "pat".to_string(),
            password: "secret123".to_string(),
            role: Role::Passenger,
        })
        .await
        .unwrap();

    assert_eq!(identity.id, "pat");
    assert_eq!(identity.name, "pat");
    assert_eq!(identity.role, Role::Passenger);
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid credentials"})))
        .mount(&backend.server)
        .await;

    let error = auth_service(&backend)
        .sign_in(&SignInForm {
            username: "pat".to_string(),
            password: "wrong-pass".to_string(),
            role: Role::Passenger,
        })
        .await
        .unwrap_err();

    assert_matches!(error, AuthError::Api(ApiError::Unauthorized));
    assert_eq!(error.user_message(), "Invalid username or password");
    assert!(!backend.session.is_authenticated());
}

#[tokio::test]
async fn test_sign_in_invalid_form_makes_no_request() {
    let backend = MockBackend::start().await;

    let error = auth_service(&backend)
        .sign_in(&SignInForm {
            username: "pat".to_string(),
            password: "123".to_string(),
            role: Role::Passenger,
        })
        .await
        .unwrap_err();

    assert_matches!(error, AuthError::Validation(_));
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_driver_sign_up_uses_driver_endpoint_then_logs_in() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/driver/register/"))
        .and(body_json(json!({
            "username": "dana",
            "password": "secret123",
            "password2": "secret123",
            "email": "dana@example.com",
            "firstname": "Dana",
            "lastname": "Driver"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rides/auth/register/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
        .expect(1)
        .mount(&backend.server)
        .await;

    let identity = auth_service(&backend)
        .sign_up(&sign_up_form(Role::Driver))
        .await
        .unwrap();

    assert_eq!(identity.role, Role::Driver);
    assert_eq!(backend.session.token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn test_sign_up_registration_rejected() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/register/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Username already taken"})),
        )
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "fresh"})))
        .expect(0)
        .mount(&backend.server)
        .await;

    let error = auth_service(&backend)
        .sign_up(&sign_up_form(Role::Passenger))
        .await
        .unwrap_err();

    assert_eq!(error.user_message(), "Username already taken");
    assert!(!backend.session.is_authenticated());
}

#[tokio::test]
async fn test_sign_up_login_failure_is_distinct() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/register/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&backend.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend.server)
        .await;

    let error = auth_service(&backend)
        .sign_up(&sign_up_form(Role::Passenger))
        .await
        .unwrap_err();

    assert_matches!(error, AuthError::LoginAfterRegister(ApiError::Status { status: 500, .. }));
    assert_eq!(
        error.user_message(),
        "Registration successful, but login failed. Please sign in manually."
    );
    assert!(!backend.session.is_authenticated());
}

#[tokio::test]
async fn test_sign_out_clears_session() {
    let backend = MockBackend::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rides/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .mount(&backend.server)
        .await;

    let service = auth_service(&backend);
    service
        .sign_in(&SignInForm {
            username: "pat".to_string(),
            password: "secret123".to_string(),
            role: Role::Passenger,
        })
        .await
        .unwrap();
    service.sign_out().unwrap();

    assert!(!backend.session.is_authenticated());
}
