//! In-process store backend
//!
//! Holds users and reset tokens behind a single mutex so every trait call
//! is atomic, including the consume compare-and-set. Used for local runs and
//! tests where no PostgreSQL is available.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use warden_core::{
    normalize_email, normalize_username, CredentialStore, DomainError, NewResetToken, NewUser,
    RepoResult, ResetToken, ResetTokenStore, User, UserId,
};

#[derive(Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    tokens: Vec<ResetToken>,
    next_user_id: i64,
    next_token_id: i64,
}

impl MemoryState {
    fn user_by<F>(&self, pred: F) -> Option<&User>
    where
        F: Fn(&User) -> bool,
    {
        self.users.values().find(|u| pred(u))
    }
}

/// In-process implementation of both store traits
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryStore")
            .field("users", &state.users.len())
            .field("tokens", &state.tokens.len())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username = normalize_username(username);
        Ok(self
            .state
            .lock()
            .user_by(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self.state.lock().user_by(|u| u.email == email).cloned())
    }

    async fn create(&self, user: &NewUser) -> RepoResult<User> {
        let mut state = self.state.lock();

        if state.user_by(|u| u.username == user.username).is_some() {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if state.user_by(|u| u.email == user.email).is_some() {
            return Err(DomainError::EmailAlreadyExists);
        }

        state.next_user_id += 1;
        let created = User {
            id: UserId::new(state.next_user_id),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        let user = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.state.lock().users.len() as i64)
    }

    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}

#[async_trait]
impl ResetTokenStore for MemoryStore {
    async fn insert(&self, token: &NewResetToken) -> RepoResult<ResetToken> {
        let mut state = self.state.lock();

        if !state.users.contains_key(&token.user_id) {
            return Err(DomainError::UserNotFound(token.user_id));
        }
        if state.tokens.iter().any(|t| t.token == token.token) {
            return Err(DomainError::ResetTokenExists);
        }

        state.next_token_id += 1;
        let stored = ResetToken {
            id: state.next_token_id,
            user_id: token.user_id,
            token: token.token.clone(),
            expires_at: token.expires_at,
            used: false,
            created_at: token.created_at,
        };
        state.tokens.push(stored.clone());
        Ok(stored)
    }

    async fn find_with_user(&self, token: &str) -> RepoResult<Option<(ResetToken, User)>> {
        let state = self.state.lock();
        Ok(state
            .tokens
            .iter()
            .find(|t| t.token == token)
            .and_then(|t| state.users.get(&t.user_id).map(|u| (t.clone(), u.clone()))))
    }

    async fn consume(
        &self,
        token_id: i64,
        user_id: UserId,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool> {
        let mut state = self.state.lock();
        let MemoryState { users, tokens, .. } = &mut *state;

        let Some(token) = tokens
            .iter_mut()
            .find(|t| t.id == token_id && t.user_id == user_id)
        else {
            return Ok(false);
        };
        if !token.is_consumable(now) {
            return Ok(false);
        }

        let user = users
            .get_mut(&user_id)
            .ok_or(DomainError::UserNotFound(user_id))?;
        token.used = true;
        user.password_hash = new_password_hash.to_string();
        Ok(true)
    }
}
