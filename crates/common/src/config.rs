use std::fmt;

use crate::error::AppError;

/// Default maximum number of pooled PostgreSQL connections.
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Default SendGrid API base URL.
const DEFAULT_SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// Default relay bind address. The relay is an internal service.
const DEFAULT_RELAY_HOST: &str = "127.0.0.1";
const DEFAULT_RELAY_PORT: u16 = 5001;

/// Backend configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Raw datastore URL, normalized later by [`crate::db::ConnectionString`]
    pub database_url: String,

    /// Outbound email endpoint. `None` puts the notifier in log-only mode.
    pub email_service_url: Option<String>,

    /// Maximum number of PostgreSQL connections in the pool (default: 10)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// A missing or empty `DATABASE_URL` is a fatal startup error.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: database_url(&lookup)?,
            email_service_url: optional(&lookup, "EMAIL_SERVICE_URL"),
            db_max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
        })
    }
}

/// Mail relay configuration loaded from environment variables.
#[derive(Clone)]
pub struct RelayConfig {
    /// SendGrid API key
    pub sendgrid_api_key: String,

    /// SendGrid API base URL (overridable for staging and tests)
    pub sendgrid_api_url: String,

    /// Verified sender address
    pub email_from: String,

    pub host: String,
    pub port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            sendgrid_api_key: required(&lookup, "SENDGRID_API_KEY")?,
            sendgrid_api_url: optional(&lookup, "SENDGRID_API_URL")
                .unwrap_or_else(|| DEFAULT_SENDGRID_API_URL.to_string()),
            email_from: required(&lookup, "EMAIL_FROM")?,
            host: optional(&lookup, "RELAY_HOST").unwrap_or_else(|| DEFAULT_RELAY_HOST.to_string()),
            port: parse_or(&lookup, "RELAY_PORT", DEFAULT_RELAY_PORT)?,
        })
    }

    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("sendgrid_api_key", &"<redacted>")
            .field("sendgrid_api_url", &self.sendgrid_api_url)
            .field("email_from", &self.email_from)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Raw `DATABASE_URL`. Only an unset or empty value is fatal; the value is
/// otherwise taken as given.
pub(crate) fn database_url<F>(lookup: &F) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("DATABASE_URL")
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable is not set".to_string())
        })
}

/// Empty values count as unset.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key)
        .ok_or_else(|| AppError::Config(format!("{key} environment variable is not set")))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match optional(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a valid number"))),
        None => Ok(default),
    }
}
