pub mod api;
pub mod auth;
pub mod cli;
pub mod db;

use api::create_api_router;
use auth::{AuthConfig, AuthState, ConfigError, CredentialStore};
use axum::Router;
use db::Database;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Validated session resolution settings
    pub auth: AuthConfig,
}

/// Create the application router backed by an arbitrary credential store.
///
/// Fails if `auth` does not pass [`AuthConfig::validate`].
pub fn create_router<S: CredentialStore>(
    store: S,
    auth: AuthConfig,
) -> Result<Router, ConfigError> {
    let state = AuthState::new(store, auth)?;
    Ok(Router::new().nest("/api", create_api_router(state)))
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Result<Router, ConfigError> {
    create_router(config.db.sessions(), config.auth.clone())
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
