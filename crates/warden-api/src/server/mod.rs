//! Server setup and initialization
//!
//! Provides the main application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};
use warden_common::{AppConfig, AppError, PasswordHasher, StoreBackend, TokenIssuer};
use warden_core::{CredentialStore, ResetTokenStore};
use warden_db::{create_pool, run_migrations, MemoryStore, PgCredentialStore, PgResetTokenStore};
use warden_service::{ProvisioningService, ResetSettings, ServiceContext};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

type Stores = (Arc<dyn CredentialStore>, Arc<dyn ResetTokenStore>);

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(
        router,
        &state.config().cors,
        state.config().app.env.is_production(),
    );
    router.with_state(state)
}

/// Connect the configured store backend
async fn create_stores(config: &AppConfig) -> Result<Stores, AppError> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-process store; all data is lost on restart");
            let store = MemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        StoreBackend::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".to_string()))?;

            info!("Connecting to PostgreSQL...");
            let db_config = warden_db::DatabaseConfig::new(
                url,
                config.database.max_connections,
                config.database.min_connections,
            );
            let pool = create_pool(&db_config)
                .await
                .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
            info!("PostgreSQL connection established");

            if config.database.auto_migrate {
                run_migrations(&pool)
                    .await
                    .map_err(|e| AppError::StoreUnavailable(format!("Schema setup failed: {e}")))?;
                info!("Database schema is up to date");
            }

            Ok((
                Arc::new(PgCredentialStore::new(pool.clone())),
                Arc::new(PgResetTokenStore::new(pool)),
            ))
        }
    }
}

/// Initialize all dependencies and create AppState
///
/// Signing and hashing settings are validated here, so a bad secret or work
/// factor stops startup before the listener binds.
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let token_issuer = Arc::new(TokenIssuer::new(&config.jwt)?);
    let password_hasher = Arc::new(PasswordHasher::new(&config.password)?);
    info!(?token_issuer, ?password_hasher, "Credential primitives ready");

    let (credential_store, reset_store) = create_stores(&config).await?;

    let reset_settings =
        ResetSettings::try_from(&config.reset).map_err(|e| AppError::Config(e.to_string()))?;

    let service_context = ServiceContext::builder()
        .credential_store(credential_store)
        .reset_store(reset_store)
        .token_issuer(token_issuer)
        .password_hasher(password_hasher)
        .reset_settings(reset_settings)
        .store_timeout(Duration::from_millis(config.database.store_timeout_ms))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    if config.reset.echo_token {
        warn!("RESET_TOKEN_ECHO is enabled: reset tokens are returned to callers");
    }

    if let Some(password) = config.admin_bootstrap_password.as_deref() {
        let created = ProvisioningService::new(&service_context)
            .bootstrap_admin(password)
            .await
            .map_err(AppError::from)?;
        if let Some(admin) = created {
            info!(user_id = %admin.id, "Bootstrap admin account created");
        }
    }

    Ok(AppState::new(service_context, config))
}

/// Run the HTTP server until interrupted
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(anyhow::anyhow!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid API_HOST/API_PORT: {e}")))?;

    // Create app state
    let state = create_app_state(config).await?;

    // Build application
    let app = create_app(state);

    // Run server
    run_server(app, addr).await
}
