//! Service context - dependency container for services
//!
//! Holds the stores, token issuer, password hasher and reset settings
//! needed by services, plus the guards every store call goes through.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use warden_common::{PasswordHasher, ResetConfig, TokenIssuer};
use warden_core::{
    CredentialStore, DomainError, RepoResult, ResetTokenStore, DEFAULT_RESET_TOKEN_TTL_MINUTES,
    MAX_TOKEN_TTL_MINUTES,
};

use super::error::{ServiceError, ServiceResult};

/// Default upper bound on a single store call
pub const DEFAULT_STORE_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// Reset token issuance settings
#[derive(Debug, Clone, Copy)]
pub struct ResetSettings {
    /// Validity window of a newly issued token
    pub token_ttl: Duration,
    /// Return the generated token in the forgot-password response.
    /// Diagnostic only; configuration refuses it in production.
    pub expose_token: bool,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(DEFAULT_RESET_TOKEN_TTL_MINUTES),
            expose_token: false,
        }
    }
}

impl TryFrom<&ResetConfig> for ResetSettings {
    type Error = ServiceError;

    fn try_from(config: &ResetConfig) -> Result<Self, Self::Error> {
        let token_ttl = Duration::try_minutes(config.token_ttl_minutes)
            .ok_or_else(|| ServiceError::validation("reset token ttl out of range"))?;

        Ok(Self {
            token_ttl,
            expose_token: config.echo_token,
        })
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Stores
    credential_store: Arc<dyn CredentialStore>,
    reset_store: Arc<dyn ResetTokenStore>,

    // Crypto
    token_issuer: Arc<TokenIssuer>,
    password_hasher: Arc<PasswordHasher>,

    // Settings
    reset_settings: ResetSettings,
    store_timeout: StdDuration,
}

impl ServiceContext {
    /// Create a builder
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Stores ===

    /// Get the credential store
    pub fn credential_store(&self) -> &dyn CredentialStore {
        self.credential_store.as_ref()
    }

    /// Get the reset token store
    pub fn reset_store(&self) -> &dyn ResetTokenStore {
        self.reset_store.as_ref()
    }

    // === Crypto ===

    /// Get the bearer token issuer
    pub fn token_issuer(&self) -> &TokenIssuer {
        self.token_issuer.as_ref()
    }

    // === Settings ===

    pub fn reset_settings(&self) -> ResetSettings {
        self.reset_settings
    }

    // === Guards ===

    /// Run a store call under the configured timeout.
    ///
    /// An elapsed timeout becomes `DomainError::StoreTimeout`, so callers
    /// report it as a transient outage rather than a business failure.
    pub async fn store_call<T, F>(&self, call: F) -> ServiceResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                tracing::warn!(timeout_ms = self.store_timeout.as_millis() as u64, "Store call timed out");
                Err(ServiceError::Domain(DomainError::StoreTimeout))
            }
        }
    }

    /// Hash a password off the async runtime
    pub async fn hash_password(&self, password: &str) -> ServiceResult<String> {
        let hasher = Arc::clone(&self.password_hasher);
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ServiceError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(ServiceError::from)
    }

    /// Whether a stored hash predates the current work factor
    pub fn password_needs_rehash(&self, stored_hash: &str) -> bool {
        self.password_hasher.needs_rehash(stored_hash)
    }

    /// Verify a password off the async runtime.
    ///
    /// With no stored hash the dummy verification runs instead, so an unknown
    /// account costs the same as a wrong password.
    pub async fn verify_password(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> ServiceResult<bool> {
        let hasher = Arc::clone(&self.password_hasher);
        let password = password.to_owned();
        let stored_hash = stored_hash.map(str::to_owned);
        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| ServiceError::internal(format!("Password verification task failed: {e}")))
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("stores", &"...")
            .field("token_issuer", &self.token_issuer)
            .field("password_hasher", &self.password_hasher)
            .field("reset_settings", &self.reset_settings)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    credential_store: Option<Arc<dyn CredentialStore>>,
    reset_store: Option<Arc<dyn ResetTokenStore>>,
    token_issuer: Option<Arc<TokenIssuer>>,
    password_hasher: Option<Arc<PasswordHasher>>,
    reset_settings: ResetSettings,
    store_timeout: StdDuration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            credential_store: None,
            reset_store: None,
            token_issuer: None,
            password_hasher: None,
            reset_settings: ResetSettings::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credential_store = Some(store);
        self
    }

    pub fn reset_store(mut self, store: Arc<dyn ResetTokenStore>) -> Self {
        self.reset_store = Some(store);
        self
    }

    pub fn token_issuer(mut self, issuer: Arc<TokenIssuer>) -> Self {
        self.token_issuer = Some(issuer);
        self
    }

    pub fn password_hasher(mut self, hasher: Arc<PasswordHasher>) -> Self {
        self.password_hasher = Some(hasher);
        self
    }

    pub fn reset_settings(mut self, settings: ResetSettings) -> Self {
        self.reset_settings = settings;
        self
    }

    pub fn store_timeout(mut self, timeout: StdDuration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    /// or a setting is out of range
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let ttl = self.reset_settings.token_ttl;
        if ttl <= Duration::zero() || ttl > Duration::minutes(MAX_TOKEN_TTL_MINUTES) {
            return Err(ServiceError::validation(format!(
                "reset token ttl must be between 1 and {MAX_TOKEN_TTL_MINUTES} minutes"
            )));
        }
        if self.store_timeout.is_zero() {
            return Err(ServiceError::validation("store timeout must be positive"));
        }

        Ok(ServiceContext {
            credential_store: self
                .credential_store
                .ok_or_else(|| ServiceError::validation("credential_store is required"))?,
            reset_store: self
                .reset_store
                .ok_or_else(|| ServiceError::validation("reset_store is required"))?,
            token_issuer: self
                .token_issuer
                .ok_or_else(|| ServiceError::validation("token_issuer is required"))?,
            password_hasher: self
                .password_hasher
                .ok_or_else(|| ServiceError::validation("password_hasher is required"))?,
            reset_settings: self.reset_settings,
            store_timeout: self.store_timeout,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
