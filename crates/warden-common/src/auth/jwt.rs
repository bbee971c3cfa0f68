//! Bearer token issuing and verification
//!
//! HS256-signed JWTs carrying subject, username, role, issuer, audience and expiry.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use warden_core::{Role, UserId, MAX_TOKEN_TTL_MINUTES};

use crate::config::JwtConfig;
use crate::error::AppError;

/// Shortest accepted signing secret, in bytes (the HS256 output size)
pub const MIN_SECRET_LEN: usize = 32;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    pub unique_name: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the subject as a UserId
    ///
    /// # Errors
    /// Returns an error if the subject is not a valid id
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Expiry as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_default()
    }
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens with a symmetric secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer from configuration.
    ///
    /// # Errors
    /// Returns `AppError::Config` when the secret is empty or shorter than
    /// [`MIN_SECRET_LEN`] bytes, when issuer or audience is blank, or when the
    /// TTL is not between one minute and one year. Callers treat this as fatal
    /// at startup.
    pub fn new(config: &JwtConfig) -> Result<Self, AppError> {
        let secret = config.secret.as_bytes();
        if config.secret.trim().is_empty() {
            return Err(AppError::Config("JWT signing secret is missing".to_string()));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT signing secret must be at least {MIN_SECRET_LEN} bytes (got {})",
                secret.len()
            )));
        }
        if config.issuer.trim().is_empty() || config.audience.trim().is_empty() {
            return Err(AppError::Config(
                "JWT issuer and audience must be configured".to_string(),
            ));
        }
        let ttl = Some(config.expires_in_minutes)
            .filter(|m| (1..=MAX_TOKEN_TTL_MINUTES).contains(m))
            .and_then(Duration::try_minutes)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "JWT lifetime must be between 1 and {MAX_TOKEN_TTL_MINUTES} minutes"
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl,
        })
    }

    /// Issue a signed token for a user, valid from `now` for the configured TTL
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Token expiry out of range")))?;
        let claims = Claims {
            sub: user_id.to_string(),
            unique_name: username.to_string(),
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode JWT: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Decode and validate a token: signature, expiry, issuer and audience
    ///
    /// # Errors
    /// Returns `TokenExpired` for an expired token and `InvalidToken` otherwise
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-that-is-long-enough-for-hs256".to_string(),
            issuer: "warden".to_string(),
            audience: "warden-clients".to_string(),
            expires_in_minutes: 60,
        }
    }

    fn create_test_issuer() -> TokenIssuer {
        TokenIssuer::new(&test_config()).unwrap()
    }

    #[test]
    fn test_issue_and_decode() {
        let issuer = create_test_issuer();
        let now = Utc::now();

        let issued = issuer.issue(UserId::new(12345), "alice", Role::Admin, now).unwrap();
        let claims = issuer.decode(&issued.token).unwrap();

        assert_eq!(claims.sub, "12345");
        assert_eq!(claims.user_id().unwrap(), UserId::new(12345));
        assert_eq!(claims.unique_name, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "warden");
        assert_eq!(claims.aud, "warden-clients");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + Duration::minutes(60)).timestamp());
        assert_eq!(claims.expires_at().timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_token_has_three_base64url_segments() {
        let issuer = create_test_issuer();
        let issued = issuer.issue(UserId::new(1), "bob", Role::User, Utc::now()).unwrap();

        let segments: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert!(URL_SAFE_NO_PAD.decode(segment).is_ok());
        }

        let header: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(segments[0]).unwrap()).unwrap();
        assert_eq!(header["alg"], "HS256");
    }

    #[test]
    fn test_missing_secret_rejected() {
        let mut config = test_config();
        config.secret = String::new();
        assert!(matches!(TokenIssuer::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = test_config();
        config.secret = "a".repeat(MIN_SECRET_LEN - 1);
        assert!(matches!(TokenIssuer::new(&config), Err(AppError::Config(_))));

        config.secret = "a".repeat(MIN_SECRET_LEN);
        assert!(TokenIssuer::new(&config).is_ok());
    }

    #[test]
    fn test_blank_issuer_rejected() {
        let mut config = test_config();
        config.issuer = " ".to_string();
        assert!(matches!(TokenIssuer::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_lifetime_bounds() {
        let mut config = test_config();
        for minutes in [0, -5, MAX_TOKEN_TTL_MINUTES + 1, 1_000_000_000_000, i64::MAX] {
            config.expires_in_minutes = minutes;
            assert!(
                matches!(TokenIssuer::new(&config), Err(AppError::Config(_))),
                "{minutes} minutes accepted"
            );
        }

        config.expires_in_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(TokenIssuer::new(&config).is_ok());
    }

    #[test]
    fn test_issue_near_end_of_time_fails_cleanly() {
        let issuer = create_test_issuer();
        let result = issuer.issue(UserId::new(1), "alice", Role::User, DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_expired_token() {
        let issuer = create_test_issuer();
        // Well beyond the default 60s leeway
        let issued_at = Utc::now() - Duration::hours(3);
        let issued = issuer.issue(UserId::new(1), "alice", Role::User, issued_at).unwrap();

        assert!(matches!(issuer.decode(&issued.token), Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issued = create_test_issuer()
            .issue(UserId::new(1), "alice", Role::User, Utc::now())
            .unwrap();

        let mut other = test_config();
        other.secret = "another-secret-key-that-is-long-enough-too".to_string();
        let other = TokenIssuer::new(&other).unwrap();

        assert!(matches!(other.decode(&issued.token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let issued = create_test_issuer()
            .issue(UserId::new(1), "alice", Role::User, Utc::now())
            .unwrap();

        let mut other = test_config();
        other.audience = "someone-else".to_string();
        let other = TokenIssuer::new(&other).unwrap();

        assert!(matches!(other.decode(&issued.token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let issued = create_test_issuer()
            .issue(UserId::new(1), "alice", Role::User, Utc::now())
            .unwrap();

        let mut other = test_config();
        other.issuer = "impostor".to_string();
        let other = TokenIssuer::new(&other).unwrap();

        assert!(matches!(other.decode(&issued.token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_invalid_token() {
        let issuer = create_test_issuer();
        assert!(matches!(
            issuer.decode("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let printed = format!("{:?}", create_test_issuer());
        assert!(!printed.contains("test-secret-key"));
        assert!(printed.contains("warden-clients"));
    }
}
