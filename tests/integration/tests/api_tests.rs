//! API Integration Tests
//!
//! Each test starts its own server on the in-process store and talks to it
//! over HTTP, so no external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{assert_json, assert_status, fixtures::*, test_config, TestServer};
use reqwest::StatusCode;

async fn echo_server() -> TestServer {
    let config = test_config(&[("RESET_TOKEN_ECHO", "true")]).expect("Invalid config");
    TestServer::start_with(config, vec![alice()])
        .await
        .expect("Failed to start server")
}

async fn login_status(server: &TestServer, username: &str, password: &str) -> StatusCode {
    server
        .post("/api/auth/login", &LoginRequest::new(username, password))
        .await
        .expect("Request failed")
        .status()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// End-to-end Tests
// ============================================================================

#[tokio::test]
async fn test_full_password_reset_flow() {
    let server = echo_server().await;

    // Login with the original password
    let response = server
        .post("/api/auth/login", &LoginRequest::new("alice", ALICE_PASSWORD))
        .await
        .unwrap();
    let login: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(login.token.split('.').count(), 3);

    // Request a reset token
    let response = server
        .post("/api/auth/forgot-password", &ForgotPasswordRequest::new("alice@x.com"))
        .await
        .unwrap();
    let forgot: ForgotPasswordResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        forgot.message,
        "If that email exists, a reset token has been issued."
    );
    let reset_token = forgot.reset_token.expect("token echo is enabled");

    // Redeem it
    let response = server
        .post(
            "/api/auth/reset-password",
            &ResetPasswordRequest::new(&reset_token, "NewSecret2!"),
        )
        .await
        .unwrap();
    let done: MessageResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(done.message, "Password has been reset successfully.");

    // Old password no longer works, new one does
    assert_eq!(
        login_status(&server, "alice", ALICE_PASSWORD).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        login_status(&server, "alice", "NewSecret2!").await,
        StatusCode::OK
    );

    // The token is spent
    let response = server
        .post(
            "/api/auth/reset-password",
            &ResetPasswordRequest::new(&reset_token, "Another3!"),
        )
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.code, "INVALID_OR_EXPIRED_TOKEN");
    assert_eq!(error.message, "Invalid or expired reset token.");
}

#[tokio::test]
async fn test_me_returns_token_identity() {
    let account = unique_account();
    let server = TestServer::start_with(test_config(&[]).unwrap(), vec![account.clone()])
        .await
        .expect("Failed to start server");

    let response = server
        .post("/api/auth/login", &LoginRequest::for_account(&account))
        .await
        .unwrap();
    let login: TokenResponse = assert_json(response, StatusCode::OK).await.unwrap();

    let response = server.get_auth("/api/auth/me", &login.token).await.unwrap();
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.username, account.username);
    assert_eq!(me.role, "User");
    assert!(!me.id.is_empty());
    assert!(!me.expires_at.is_empty());
}

// ============================================================================
// Enumeration Resistance Tests
// ============================================================================

#[tokio::test]
async fn test_login_failure_bodies_identical() {
    let server = TestServer::start_with(test_config(&[]).unwrap(), vec![alice()])
        .await
        .expect("Failed to start server");

    let wrong_password = server
        .post("/api/auth/login", &LoginRequest::new("alice", "Wrong1!x"))
        .await
        .unwrap();
    let wrong_password: ErrorBody = assert_json(wrong_password, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    let unknown_user = server
        .post("/api/auth/login", &LoginRequest::new("mallory", ALICE_PASSWORD))
        .await
        .unwrap();
    let unknown_user: ErrorBody = assert_json(unknown_user, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password.message, "Invalid username or password.");
}

#[tokio::test]
async fn test_forgot_password_bodies_identical() {
    let server = TestServer::start_with(test_config(&[]).unwrap(), vec![alice()])
        .await
        .expect("Failed to start server");

    let known = server
        .post("/api/auth/forgot-password", &ForgotPasswordRequest::new("alice@x.com"))
        .await
        .unwrap();
    assert_eq!(known.status(), StatusCode::OK);
    let known = known.bytes().await.unwrap();

    let unknown = server
        .post("/api/auth/forgot-password", &ForgotPasswordRequest::new("nobody@x.com"))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown = unknown.bytes().await.unwrap();

    assert_eq!(known, unknown);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_weak_new_password_rejected() {
    let server = echo_server().await;

    let response = server
        .post("/api/auth/forgot-password", &ForgotPasswordRequest::new("alice@x.com"))
        .await
        .unwrap();
    let forgot: ForgotPasswordResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let reset_token = forgot.reset_token.unwrap();

    let response = server
        .post(
            "/api/auth/reset-password",
            &ResetPasswordRequest::new(&reset_token, "short"),
        )
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.code, "VALIDATION_ERROR");

    // Original password still valid
    assert_eq!(
        login_status(&server, "alice", ALICE_PASSWORD).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_unknown_reset_token_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post(
            "/api/auth/reset-password",
            &ResetPasswordRequest::new("does-not-exist", "NewSecret2!"),
        )
        .await
        .unwrap();
    let error: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(error.code, "INVALID_OR_EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_concurrent_resets_single_winner() {
    let server = echo_server().await;

    let response = server
        .post("/api/auth/forgot-password", &ForgotPasswordRequest::new("alice@x.com"))
        .await
        .unwrap();
    let forgot: ForgotPasswordResponse = assert_json(response, StatusCode::OK).await.unwrap();
    let reset_token = forgot.reset_token.unwrap();

    let requests: Vec<_> = (0..6)
        .map(|i| ResetPasswordRequest::new(&reset_token, &format!("Parallel{i}x!")))
        .collect();
    let responses = join_all(
        requests
            .iter()
            .map(|request| server.post("/api/auth/reset-password", request)),
    )
    .await;

    let successes = responses
        .into_iter()
        .filter(|response| response.as_ref().unwrap().status() == StatusCode::OK)
        .count();
    assert_eq!(successes, 1);
}
