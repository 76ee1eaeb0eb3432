//! Datastore connection resolver.
//!
//! `DATABASE_URL` arrives in whatever shape the hosting platform hands out:
//! a `postgres://` URL, a `postgresql://` URL, an already driver-qualified
//! `jdbc:` string, or a bare `host:port/db`. [`ConnectionString`] normalizes
//! all of them to the driver-qualified `jdbc:postgresql://` form, and
//! [`ConnectionProvider`] turns that into a sqlx pool.
//!
//! Reachability is never checked here: the lazy pool surfaces connection
//! failures at the first query.

use std::fmt;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::{self, AppConfig};
use crate::error::AppError;

/// Driver-qualified scheme every normalized connection string starts with
/// (unless it was already qualified for another driver).
pub const DRIVER_SCHEME: &str = "jdbc:postgresql://";

/// Fixed driver identifier for every provider built here.
pub const DRIVER_NAME: &str = "postgresql";

const DRIVER_QUALIFIER: &str = "jdbc:";
const BARE_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

/// A driver-qualified datastore connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString(String);

impl ConnectionString {
    /// Normalize a raw datastore URL.
    ///
    /// - `postgres://rest` / `postgresql://rest` become `jdbc:postgresql://rest`
    /// - anything starting with `jdbc:` passes through untouched
    /// - anything else is treated as a bare host and gets `jdbc:postgresql://`
    pub fn normalize(raw: &str) -> Self {
        if let Some(rest) = BARE_SCHEMES
            .iter()
            .find_map(|scheme| raw.strip_prefix(scheme))
        {
            return Self(format!("{DRIVER_SCHEME}{rest}"));
        }

        if raw.starts_with(DRIVER_QUALIFIER) {
            return Self(raw.to_string());
        }

        Self(format!("{DRIVER_SCHEME}{raw}"))
    }

    /// Read and normalize `DATABASE_URL` from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read and normalize `DATABASE_URL` through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = config::database_url(&lookup)?;
        Ok(Self::normalize(&raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URL without the `jdbc:` qualifier, as sqlx expects it.
    pub fn driver_url(&self) -> &str {
        self.0.strip_prefix(DRIVER_QUALIFIER).unwrap_or(&self.0)
    }

    /// The connection string with any password in the userinfo masked.
    ///
    /// Userinfo runs up to the last `@` before the query string, so a
    /// password containing `/` or `@` is still masked in full.
    pub fn redacted(&self) -> String {
        let Some(scheme_end) = self.0.find("://").map(|i| i + 3) else {
            return self.0.clone();
        };
        let query_start = self.0[scheme_end..]
            .find('?')
            .map_or(self.0.len(), |i| scheme_end + i);

        let Some(at) = self.0[scheme_end..query_start].rfind('@') else {
            return self.0.clone();
        };
        let userinfo = &self.0[scheme_end..scheme_end + at];

        match userinfo.find(':') {
            Some(colon) => format!(
                "{}{}:****{}",
                &self.0[..scheme_end],
                &userinfo[..colon],
                &self.0[scheme_end + at..]
            ),
            None => self.0.clone(),
        }
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionString")
            .field(&self.redacted())
            .finish()
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Connection provider configured with a normalized URL and the fixed
/// PostgreSQL driver identifier.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    url: ConnectionString,
    driver: &'static str,
}

impl ConnectionProvider {
    pub fn new(url: ConnectionString) -> Self {
        Self {
            url,
            driver: DRIVER_NAME,
        }
    }

    /// Resolve `DATABASE_URL` and build a provider. Fails fast if it is unset.
    pub fn from_env() -> Result<Self, AppError> {
        ConnectionString::from_env().map(Self::new)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ConnectionString::normalize(&config.database_url))
    }

    pub fn url(&self) -> &ConnectionString {
        &self.url
    }

    pub fn driver(&self) -> &'static str {
        self.driver
    }

    fn pool_options(max_connections: u32) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
    }

    /// Build a pool that opens connections on first use.
    ///
    /// Only the URL syntax is checked here. Must be called inside a Tokio
    /// runtime because the pool spawns its maintenance task immediately.
    pub fn connect_lazy(&self, max_connections: u32) -> Result<PgPool, AppError> {
        let pool = Self::pool_options(max_connections).connect_lazy(self.url.driver_url())?;
        tracing::debug!(
            url = %self.url,
            driver = self.driver,
            max_connections,
            "Lazy PostgreSQL pool configured"
        );
        Ok(pool)
    }
}

/// Create a PostgreSQL connection pool and open the first connection.
///
/// `max_connections` controls the maximum number of connections in the pool.
/// Pass `AppConfig::db_max_connections` for the user-configured value (default 10).
pub async fn create_pool(
    provider: &ConnectionProvider,
    max_connections: u32,
) -> anyhow::Result<PgPool> {
    let pool = ConnectionProvider::pool_options(max_connections)
        .connect(provider.url().driver_url())
        .await?;

    tracing::info!(url = %provider.url(), max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_scheme_is_rewritten() {
        let url = ConnectionString::normalize("postgres://edu:pw@db:5432/edu?sslmode=require");
        assert_eq!(
            url.as_str(),
            "jdbc:postgresql://edu:pw@db:5432/edu?sslmode=require"
        );
    }

    #[test]
    fn test_postgresql_scheme_is_rewritten() {
        let url = ConnectionString::normalize("postgresql://localhost/edu");
        assert_eq!(url.as_str(), "jdbc:postgresql://localhost/edu");
    }

    #[test]
    fn test_jdbc_url_passes_through() {
        let raw = "jdbc:postgresql://localhost:5432/edu";
        assert_eq!(ConnectionString::normalize(raw).as_str(), raw);

        let other_driver = "jdbc:mysql://localhost/edu";
        assert_eq!(ConnectionString::normalize(other_driver).as_str(), other_driver);
    }

    #[test]
    fn test_bare_host_gets_default_scheme() {
        let url = ConnectionString::normalize("db.internal:5432/edu");
        assert_eq!(url.as_str(), "jdbc:postgresql://db.internal:5432/edu");
    }

    #[test]
    fn test_scheme_must_be_a_prefix() {
        // The scheme text appearing later in the string is not a scheme.
        let url = ConnectionString::normalize("proxy/postgres://inner");
        assert_eq!(url.as_str(), "jdbc:postgresql://proxy/postgres://inner");
    }

    #[test]
    fn test_driver_url_strips_qualifier() {
        let url = ConnectionString::normalize("postgres://localhost/edu");
        assert_eq!(url.driver_url(), "postgresql://localhost/edu");
    }

    #[test]
    fn test_from_lookup_missing_or_empty() {
        assert!(matches!(
            ConnectionString::from_lookup(|_| None),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ConnectionString::from_lookup(|_| Some(String::new())),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_from_lookup_normalizes() {
        let url = ConnectionString::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/edu".to_string())
        })
        .unwrap();
        assert_eq!(url.as_str(), "jdbc:postgresql://localhost/edu");
    }

    #[test]
    fn test_redacted_masks_password() {
        let url = ConnectionString::normalize("postgres://edu:hunter2@db:5432/edu");
        assert_eq!(url.redacted(), "jdbc:postgresql://edu:****@db:5432/edu");
        assert!(!format!("{url:?}").contains("hunter2"));
        assert!(!url.to_string().contains("hunter2"));
    }

    #[test]
    fn test_redacted_masks_password_with_reserved_chars() {
        let url = ConnectionString::normalize("postgres://u:p/w@h/db");
        assert_eq!(url.redacted(), "jdbc:postgresql://u:****@h/db");

        let url = ConnectionString::normalize("postgres://edu:s3cr@t/x@db:5432/edu?sslmode=require");
        assert_eq!(
            url.redacted(),
            "jdbc:postgresql://edu:****@db:5432/edu?sslmode=require"
        );
        assert!(!url.to_string().contains("s3cr"));
    }

    #[test]
    fn test_redacted_without_credentials_is_unchanged() {
        let url = ConnectionString::normalize("db:5432/edu");
        assert_eq!(url.redacted(), "jdbc:postgresql://db:5432/edu");

        let user_only = ConnectionString::normalize("postgres://edu@db/edu");
        assert_eq!(user_only.redacted(), "jdbc:postgresql://edu@db/edu");
    }

    #[test]
    fn test_provider_uses_fixed_driver() {
        let config = AppConfig {
            database_url: "db.internal/edu".to_string(),
            email_service_url: None,
            db_max_connections: 5,
        };
        let provider = ConnectionProvider::from_config(&config);
        assert_eq!(provider.driver(), "postgresql");
        assert_eq!(provider.url().as_str(), "jdbc:postgresql://db.internal/edu");
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_contact_server() {
        // Nothing listens on port 1; a lazy pool must still build.
        let provider = ConnectionProvider::new(ConnectionString::normalize(
            "postgres://edu:pw@127.0.0.1:1/edu",
        ));
        let pool = provider.connect_lazy(2).unwrap();
        assert_eq!(pool.size(), 0);
    }
}
