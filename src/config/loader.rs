//! Build settings from environment variables.

use crate::config::types::{CorsOrigins, DatabaseTarget, Environment, PostgresSettings, Settings};
use crate::error::ConfigError;
use std::net::{IpAddr, SocketAddr};

pub const ENV_SELECTOR: &str = "APP_ENV";

const DEFAULT_SECRET_KEY: &str = "dev_key_please_change_in_production";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "password";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_NAME: &str = "records";
const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_BIND_PORT: u16 = 5000;

impl Settings {
    /// Read `APP_ENV` and the rest of the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |key: &str| std::env::var(key).ok();
        let env_name = lookup(ENV_SELECTOR);
        Self::from_lookup(env_name.as_deref(), lookup)
    }

    /// Build settings for the named environment. `lookup` returns the raw value of a variable;
    /// empty values count as unset.
    pub fn from_lookup<F>(env_name: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let environment = Environment::from_name(env_name);
        let production = environment == Environment::Production;

        let required_in_prod = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            match get(key) {
                Some(v) => Ok(v),
                None if production => Err(ConfigError::Missing(key)),
                None => Ok(default.to_string()),
            }
        };

        let secret_key = required_in_prod("SECRET_KEY", DEFAULT_SECRET_KEY)?;

        let database = match environment {
            Environment::Testing => DatabaseTarget::InMemory,
            Environment::Development | Environment::Production => {
                DatabaseTarget::Postgres(PostgresSettings {
                    user: required_in_prod("DB_USER", DEFAULT_DB_USER)?,
                    password: required_in_prod("DB_PASSWORD", DEFAULT_DB_PASSWORD)?,
                    host: required_in_prod("DB_HOST", DEFAULT_DB_HOST)?,
                    port: parse_port("DB_PORT", get("DB_PORT"), DEFAULT_DB_PORT)?,
                    name: required_in_prod("DB_NAME", DEFAULT_DB_NAME)?,
                })
            }
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| CorsOrigins::parse(&raw))
            .unwrap_or(CorsOrigins::Any);

        let host = get("APP_HOST").unwrap_or_else(|| DEFAULT_BIND_HOST.to_string());
        let ip: IpAddr = host.trim().parse().map_err(|e| ConfigError::Invalid {
            var: "APP_HOST",
            reason: format!("{}: {}", host, e),
        })?;
        let port = parse_port("APP_PORT", get("APP_PORT"), DEFAULT_BIND_PORT)?;

        let debug = environment.is_debug();
        let testing = environment == Environment::Testing;

        Ok(Settings {
            environment,
            database,
            cors_origins,
            secret_key,
            debug,
            testing,
            bind_addr: SocketAddr::new(ip, port),
        })
    }
}

fn parse_port(var: &'static str, raw: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(default),
        Some(s) => s.trim().parse().map_err(|e| ConfigError::Invalid {
            var,
            reason: format!("{}: {}", s, e),
        }),
    }
}
