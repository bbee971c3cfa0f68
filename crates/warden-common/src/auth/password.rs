//! Password hashing and verification utilities
//!
//! Uses Argon2id with an explicit, configurable work factor.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version, ARGON2ID_IDENT,
};

use crate::config::PasswordConfig;
use crate::error::AppError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Argon2id password hasher
///
/// Every call to [`PasswordHasher::hash`] uses a fresh random salt, so equal
/// passwords never produce equal hashes.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// Hash of a fixed throwaway value, verified against when no user matched
    dummy_hash: String,
}

impl PasswordHasher {
    /// Create a hasher with the given work factor
    ///
    /// # Errors
    /// Returns `AppError::Config` if the argon2 parameters are out of range
    pub fn new(config: &PasswordConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::Config(format!("Invalid password hashing parameters: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"warden-unknown-account", &salt)
            .map_err(|e| AppError::Config(format!("Password hashing self-test failed: {e}")))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns an error if hashing fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))
    }

    /// Verify a password against a stored hash.
    ///
    /// The digest comparison is constant-time. An unparseable stored hash
    /// counts as a mismatch so callers cannot tell it apart from a wrong password.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Spend the same work as a real verification, then report failure.
    ///
    /// Used when the account does not exist so both login failures cost the same.
    /// The dummy hash always carries the current work factor. A stored hash made
    /// under older parameters costs its own work to verify until the next
    /// successful login replaces it (see [`PasswordHasher::needs_rehash`]).
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }

    /// Whether a stored hash was made with another algorithm or work factor
    pub fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        if parsed.algorithm != ARGON2ID_IDENT {
            return true;
        }
        let current = self.argon2.params();
        match Params::try_from(&parsed) {
            Ok(stored) => {
                stored.m_cost() != current.m_cost()
                    || stored.t_cost() != current.t_cost()
                    || stored.p_cost() != current.p_cost()
            }
            Err(_) => true,
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

/// Validate password strength
///
/// Returns `Ok(())` if the password meets requirements:
/// - 8 to 128 characters
/// - Contains at least one uppercase letter
/// - Contains at least one lowercase letter
/// - Contains at least one digit
///
/// # Errors
/// Returns a validation error if the password doesn't meet requirements
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if len > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    if !password.chars().any(char::is_uppercase) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(char::is_lowercase) {
        return Err(AppError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }

    Ok(())
}
