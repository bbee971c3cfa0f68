//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub reset: ResetConfig,
    pub password: PasswordConfig,
    pub cors: CorsConfig,
    /// Password for the first admin account, created only on an empty store
    pub admin_bootstrap_password: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app", &self.app)
            .field("api", &self.api)
            .field("database", &self.database)
            .field("jwt", &self.jwt)
            .field("reset", &self.reset)
            .field("password", &self.password)
            .field("cors", &self.cors)
            .field(
                "admin_bootstrap_password",
                &self.admin_bootstrap_password.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which store implementation backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// In-process store; data is lost on restart
    Memory,
}

/// Database / store configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Required when `backend` is `Postgres`
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Apply the bundled schema at startup
    pub auto_migrate: bool,
    /// Upper bound on any single store call made by the services
    pub store_timeout_ms: u64,
}

/// Bearer token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Signing secret; validated by `TokenIssuer::new`
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expires_in_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expires_in_minutes", &self.expires_in_minutes)
            .finish()
    }
}

/// Password reset workflow configuration
#[derive(Debug, Clone)]
pub struct ResetConfig {
    pub token_ttl_minutes: i64,
    /// Echo the raw reset token in the forgot-password response (diagnostics only)
    pub echo_token: bool,
}

/// Argon2 work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_password_memory_kib(),
            iterations: default_password_iterations(),
            parallelism: default_password_parallelism(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "warden".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_store_timeout_ms() -> u64 {
    5000
}

fn default_issuer() -> String {
    "warden".to_string()
}

fn default_audience() -> String {
    "warden-clients".to_string()
}

fn default_token_expiry_minutes() -> i64 {
    60
}

fn default_reset_ttl_minutes() -> i64 {
    warden_core::DEFAULT_RESET_TOKEN_TTL_MINUTES
}

// OWASP argon2id baseline: m=19 MiB, t=2, p=1
fn default_password_memory_kib() -> u32 {
    19_456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if required values are missing or malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let env = match vars.get("APP_ENV") {
            Some(s) => s
                .parse::<Environment>()
                .map_err(|()| ConfigError::InvalidValue("APP_ENV", s))?,
            None => Environment::default(),
        };

        let backend = match vars.get("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::InvalidValue("STORE_BACKEND", other.to_string())),
        };

        let url = vars.get("DATABASE_URL");
        if backend == StoreBackend::Postgres && url.is_none() {
            return Err(ConfigError::MissingVar("DATABASE_URL"));
        }

        let echo_token = vars.parse_or("RESET_TOKEN_ECHO", false)?;
        if echo_token && env.is_production() {
            return Err(ConfigError::InvalidValue(
                "RESET_TOKEN_ECHO",
                "must not be enabled in production".to_string(),
            ));
        }

        let config = Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ServerConfig {
                host: vars.get("API_HOST").unwrap_or_else(default_host),
                port: vars.parse_or("API_PORT", default_port())?,
            },
            database: DatabaseConfig {
                backend,
                url,
                max_connections: vars.parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections())?,
                min_connections: vars.parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections())?,
                auto_migrate: vars.parse_or("DATABASE_AUTO_MIGRATE", true)?,
                store_timeout_ms: vars.parse_or("STORE_TIMEOUT_MS", default_store_timeout_ms())?,
            },
            jwt: JwtConfig {
                secret: vars.get("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                issuer: vars.get("JWT_ISSUER").unwrap_or_else(default_issuer),
                audience: vars.get("JWT_AUDIENCE").unwrap_or_else(default_audience),
                expires_in_minutes: vars
                    .parse_or("JWT_EXPIRES_IN_MINUTES", default_token_expiry_minutes())?,
            },
            reset: ResetConfig {
                token_ttl_minutes: vars.parse_or("RESET_TOKEN_TTL_MINUTES", default_reset_ttl_minutes())?,
                echo_token,
            },
            password: PasswordConfig {
                memory_kib: vars.parse_or("PASSWORD_MEMORY_KIB", default_password_memory_kib())?,
                iterations: vars.parse_or("PASSWORD_ITERATIONS", default_password_iterations())?,
                parallelism: vars.parse_or("PASSWORD_PARALLELISM", default_password_parallelism())?,
            },
            cors: CorsConfig {
                allowed_origins: vars
                    .get("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            admin_bootstrap_password: vars.get("ADMIN_BOOTSTRAP_PASSWORD"),
        };

        check_ttl("JWT_EXPIRES_IN_MINUTES", config.jwt.expires_in_minutes)?;
        check_ttl("RESET_TOKEN_TTL_MINUTES", config.reset.token_ttl_minutes)?;

        Ok(config)
    }
}

/// Token lifetimes must be positive and at most one year
fn check_ttl(key: &'static str, minutes: i64) -> Result<(), ConfigError> {
    if (1..=warden_core::MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(key, minutes.to_string()))
    }
}

/// Lookup wrapper that treats blank values as unset
struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "an-adequately-long-test-signing-secret-value";

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = load(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.app.name, "warden");
        assert_eq!(config.app.env, Environment::Development);
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.database.store_timeout_ms, 5000);
        assert_eq!(config.jwt.issuer, "warden");
        assert_eq!(config.jwt.audience, "warden-clients");
        assert_eq!(config.jwt.expires_in_minutes, 60);
        assert_eq!(config.reset.token_ttl_minutes, 30);
        assert!(!config.reset.echo_token);
        assert_eq!(config.password, PasswordConfig::default());
        assert!(config.admin_bootstrap_password.is_none());
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = load(&[("STORE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("JWT_SECRET")));

        let err = load(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", "   ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("JWT_SECRET")));
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = load(&[("JWT_SECRET", SECRET)]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("DATABASE_URL")));

        let config = load(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgres://localhost/warden"),
        ])
        .unwrap();
        assert_eq!(config.database.backend, StoreBackend::Postgres);
    }

    #[test]
    fn test_echo_refused_in_production() {
        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("APP_ENV", "production"),
            ("RESET_TOKEN_ECHO", "true"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("RESET_TOKEN_ECHO", _)));

        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("RESET_TOKEN_ECHO", "true"),
        ])
        .unwrap();
        assert!(config.reset.echo_token);
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("API_PORT", _)));

        let err = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("RESET_TOKEN_TTL_MINUTES", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("RESET_TOKEN_TTL_MINUTES", _)));
    }

    #[test]
    fn test_lifetimes_over_a_year_rejected() {
        for key in ["JWT_EXPIRES_IN_MINUTES", "RESET_TOKEN_TTL_MINUTES"] {
            for value in ["525601", "1000000000000", "9223372036854775807"] {
                let err = load(&[
                    ("STORE_BACKEND", "memory"),
                    ("JWT_SECRET", SECRET),
                    (key, value),
                ])
                .unwrap_err();
                assert!(
                    matches!(err, ConfigError::InvalidValue(k, ref v) if k == key && v == value),
                    "{key}={value} accepted"
                );
            }
        }

        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRES_IN_MINUTES", "525600"),
            ("RESET_TOKEN_TTL_MINUTES", "525600"),
        ])
        .unwrap();
        assert_eq!(config.jwt.expires_in_minutes, 525_600);
    }

    #[test]
    fn test_cors_origins_split() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_jwt_config_debug_redacts_secret() {
        let config = load(&[("STORE_BACKEND", "memory"), ("JWT_SECRET", SECRET)]).unwrap();
        assert!(!format!("{:?}", config.jwt).contains(SECRET));
    }

    #[test]
    fn test_app_config_debug_redacts_bootstrap_password() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", SECRET),
            ("ADMIN_BOOTSTRAP_PASSWORD", "Bootstrap9!"),
        ])
        .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("Bootstrap9!"));
        assert!(!printed.contains(SECRET));
    }
}
