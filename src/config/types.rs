//! Settings types resolved once at startup.

use std::fmt;
use std::net::SocketAddr;

/// Runtime environment selected by `APP_ENV`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Exact match on a known name. Empty or absent means development; anything else is `None`.
    pub fn recognize(name: Option<&str>) -> Option<Self> {
        match name.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("testing") => Some(Environment::Testing),
            Some("production") => Some(Environment::Production),
            Some("development") | Some("") | None => Some(Environment::Development),
            Some(_) => None,
        }
    }

    /// Unknown names fall back to development with a warning.
    pub fn from_name(name: Option<&str>) -> Self {
        Self::recognize(name).unwrap_or_else(|| {
            tracing::warn!(env = ?name, "unknown environment, using development");
            Environment::Development
        })
    }

    pub fn is_debug(&self) -> bool {
        !matches!(self, Environment::Production)
    }

    /// Log filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_debug() {
            "records_api=debug,tower_http=debug"
        } else {
            "records_api=info,tower_http=info"
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters for the PostgreSQL backend.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

impl PostgresSettings {
    /// Connection URL with percent-encoded credentials.
    pub fn database_uri(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            urlencoding::encode(&self.name)
        )
    }
}

impl fmt::Debug for PostgresSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresSettings")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .finish()
    }
}

/// Where records are stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseTarget {
    Postgres(PostgresSettings),
    /// Ephemeral SQLite database that lives as long as its pool.
    InMemory,
}

impl DatabaseTarget {
    pub const IN_MEMORY_URI: &'static str = "sqlite::memory:";

    pub fn database_uri(&self) -> String {
        match self {
            DatabaseTarget::Postgres(pg) => pg.database_uri(),
            DatabaseTarget::InMemory => Self::IN_MEMORY_URI.to_string(),
        }
    }
}

/// Allowed CORS origins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// `*` (or nothing) allows any origin; otherwise a comma-separated list.
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

/// Immutable settings used to build the store and the router.
#[derive(Clone)]
pub struct Settings {
    pub environment: Environment,
    pub database: DatabaseTarget,
    pub cors_origins: CorsOrigins,
    pub secret_key: String,
    pub debug: bool,
    pub testing: bool,
    pub bind_addr: SocketAddr,
}

impl Settings {
    pub fn database_uri(&self) -> String {
        self.database.database_uri()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("environment", &self.environment)
            .field("database", &self.database)
            .field("cors_origins", &self.cors_origins)
            .field("secret_key", &"***")
            .field("debug", &self.debug)
            .field("testing", &self.testing)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}
