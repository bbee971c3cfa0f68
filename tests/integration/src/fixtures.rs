//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use warden_core::Role;
use warden_service::dto::NewAccount;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub const ALICE_PASSWORD: &str = "Secret1!";

/// The standard account used by the end-to-end flow
pub fn alice() -> NewAccount {
    NewAccount {
        username: "alice".to_string(),
        email: "alice@x.com".to_string(),
        password: ALICE_PASSWORD.to_string(),
        role: Role::User,
    }
}

/// A throwaway account with unique identifiers
pub fn unique_account() -> NewAccount {
    let suffix = unique_suffix();
    NewAccount {
        username: format!("testuser{suffix}"),
        email: format!("test{suffix}@example.com"),
        password: "TestPass123!".to_string(),
        role: Role::User,
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn for_account(account: &NewAccount) -> Self {
        Self::new(&account.username, &account.password)
    }
}

/// Forgot-password request
#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
        }
    }
}

/// Reset-password request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn new(token: &str, new_password: &str) -> Self {
        Self {
            token: token.to_string(),
            new_password: new_password.to_string(),
        }
    }
}

/// Login response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Forgot-password response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    pub reset_token: Option<String>,
}

/// Plain message response
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Identity behind a bearer token
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub username: String,
    pub role: String,
    pub expires_at: String,
}
