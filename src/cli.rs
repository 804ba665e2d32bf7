//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::{
    AuthConfig, ConfigError, LookupKey, SiteRelation, TransportPriority, site_relation,
};
use crate::db::Database;
use clap::Parser;
use tracing::{error, info, warn};
use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sessionbridge",
    about = "Session authentication bridge for cross-origin frontends"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SESSIONBRIDGE_PORT", default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file holding the provider's sessions
    #[arg(short, long, env = "SESSIONBRIDGE_DATABASE", default_value = "sessionbridge.db")]
    pub database: String,

    /// Origin the browser frontend is served from (e.g. "https://todo.vercel.app")
    #[arg(long, env = "SESSIONBRIDGE_FRONTEND_ORIGIN")]
    pub frontend_origin: Option<String>,

    /// Origin this API is served from (e.g. "https://api.example.com")
    #[arg(long, env = "SESSIONBRIDGE_BACKEND_ORIGIN")]
    pub backend_origin: Option<String>,

    /// Name of the session cookie
    #[arg(long, env = "SESSIONBRIDGE_SESSION_COOKIE", default_value = "session_token")]
    pub session_cookie_name: String,

    /// Credential used when a request carries both a bearer header and a cookie
    #[arg(long, env = "SESSIONBRIDGE_TRANSPORT_PRIORITY", value_enum, default_value = "bearer")]
    pub transport_priority: TransportPriority,

    /// Session fields a credential is matched against, in order
    #[arg(
        long,
        env = "SESSIONBRIDGE_LOOKUP_KEYS",
        value_enum,
        value_delimiter = ',',
        default_value = "token"
    )]
    pub lookup_keys: Vec<LookupKey>,

    /// Budget for one credential store lookup, in milliseconds
    #[arg(long, env = "SESSIONBRIDGE_STORE_TIMEOUT_MS", default_value = "250")]
    pub store_timeout_ms: u64,

    /// Extra attempts when the credential store is unavailable
    #[arg(long, env = "SESSIONBRIDGE_STORE_RETRIES", default_value = "0")]
    pub store_retries: u32,

    /// Issue a session for this user ID, print its token and exit
    #[arg(long, value_name = "USER_ID")]
    pub issue_session: Option<String>,

    /// Lifetime of sessions created with --issue-session, in hours
    #[arg(long, default_value = "168")]
    pub session_ttl_hours: i64,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Build the validated session settings from arguments.
pub fn auth_config(args: &Args) -> Result<AuthConfig, ConfigError> {
    AuthConfig::default()
        .with_transport_priority(args.transport_priority)
        .with_lookup_keys(args.lookup_keys.clone())
        .with_store_timeout_ms(args.store_timeout_ms)
        .with_store_retries(args.store_retries)
        .with_session_cookie_name(args.session_cookie_name.clone())
        .validate()
}

fn parse_origin(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidOrigin {
        name,
        reason: e.to_string(),
    })?;
    if !url.origin().is_tuple() {
        return Err(ConfigError::InvalidOrigin {
            name,
            reason: format!("'{}' has no scheme/host/port origin", value),
        });
    }
    Ok(url)
}

/// Compare the deployment's origins and reject settings that would make the
/// session depend on cookies the browser may not send.
///
/// Returns `None` when either origin is not configured.
pub fn check_origins(
    frontend: Option<&str>,
    backend: Option<&str>,
    auth: &AuthConfig,
) -> Result<Option<SiteRelation>, ConfigError> {
    let (Some(frontend), Some(backend)) = (frontend, backend) else {
        return Ok(None);
    };
    let frontend = parse_origin("frontend origin", frontend)?;
    let backend = parse_origin("backend origin", backend)?;

    let relation = site_relation(&frontend, &backend);
    if relation == SiteRelation::CrossSite && auth.transport_priority == TransportPriority::Cookie {
        return Err(ConfigError::CookiePriorityCrossSite);
    }
    Ok(Some(relation))
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database) -> Result<ServerConfig, ConfigError> {
    let auth = auth_config(args)?;

    match check_origins(
        args.frontend_origin.as_deref(),
        args.backend_origin.as_deref(),
        &auth,
    )? {
        Some(SiteRelation::CrossSite) => {
            info!("Cross-site deployment: clients must send Authorization: Bearer")
        }
        Some(SiteRelation::SameOrigin) => info!("Same-origin deployment"),
        None => warn!("Frontend/backend origins not configured; transport cannot be checked"),
    }

    Ok(ServerConfig { db, auth })
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Lifetime for `--issue-session`. `None` unless positive and representable.
pub fn session_ttl(hours: i64) -> Option<chrono::Duration> {
    if hours <= 0 {
        return None;
    }
    chrono::Duration::try_hours(hours)
}

/// Handle the --issue-session flag: create the user if needed and a session
/// for it, then print the client token.
pub async fn handle_issue_session(db: &Database, user_id: &str, ttl_hours: i64) {
    let Some(ttl) = session_ttl(ttl_hours) else {
        error!(ttl_hours, "Session TTL must be a positive number of hours");
        std::process::exit(1);
    };

    if let Err(e) = db.users().ensure(user_id).await {
        error!(user_id = %user_id, error = %e, "Failed to create user");
        std::process::exit(1);
    }

    match db.sessions().create(user_id, ttl).await {
        Ok(session) => {
            println!();
            println!("Session issued for user: {}", session.user_id);
            println!("Session ID: {}", session.session_id);
            println!("Token: {}", session.public_token);
            println!("Expires at: {}", session.expires_at.to_rfc3339());
            println!();
        }
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to issue session");
            std::process::exit(1);
        }
    }
}
