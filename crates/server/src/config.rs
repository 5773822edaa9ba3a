//! Process configuration read from environment variables.
//!
//! `main` loads `.env` first, so every variable may also live there.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use services::StorageSettings;
use storage::mysql::DbConfig;
use thiserror::Error;

use crate::logging::LoggingConfig;

/// Used when `SESSION_SECRET` is unset. Fine for local development only.
pub const DEV_SESSION_SECRET: &str = "career-guidance-dev-secret";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:5174",
];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Cookie-related settings.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub secret: String,
    /// Marks the cookie `Secure`; enabled when `APP_ENV=production`.
    pub secure_cookies: bool,
    pub using_dev_secret: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("secure_cookies", &self.secure_cookies)
            .field("using_dev_secret", &self.using_dev_secret)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageSettings,
    pub session: SessionConfig,
    pub cors_allowed_origins: Vec<String>,
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = parse_or(&get, "BIND_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&get, "PORT", DEFAULT_PORT)?;

        let db_defaults = DbConfig::default();
        let timeout_ms: u64 = parse_or(
            &get,
            "DB_CONNECT_TIMEOUT_MS",
            u64::try_from(db_defaults.connect_timeout.as_millis()).unwrap_or(3000),
        )?;
        let database = if flag(&get, "DB_DISABLED")? {
            None
        } else {
            Some(DbConfig {
                host: get("DB_HOST").unwrap_or(db_defaults.host),
                port: parse_or(&get, "DB_PORT", db_defaults.port)?,
                user: get("DB_USER").unwrap_or(db_defaults.user),
                // An empty password is legitimate, so read it untrimmed.
                password: lookup("DB_PASSWORD").unwrap_or(db_defaults.password),
                database: get("DB_NAME").unwrap_or(db_defaults.database),
                connect_timeout: Duration::from_millis(timeout_ms),
            })
        };
        let reprobe_secs: u64 = parse_or(&get, "DB_REPROBE_INTERVAL_SECS", 0)?;

        let (secret, using_dev_secret) = match get("SESSION_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_SESSION_SECRET.to_string(), true),
        };
        let production = get("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS").map_or_else(
            || DEFAULT_CORS_ORIGINS.iter().map(ToString::to_string).collect(),
            |raw| {
                raw.split(',')
                    .map(|o| o.trim().trim_end_matches('/').to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            },
        );

        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or_else(|| LoggingConfig::default().level),
            format: get("LOG_FORMAT").unwrap_or_else(|| LoggingConfig::default().format),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            storage: StorageSettings {
                database,
                reprobe_interval: (reprobe_secs > 0).then(|| Duration::from_secs(reprobe_secs)),
                seed_demo_user: flag(&get, "SEED_DEMO_USER")?,
            },
            session: SessionConfig {
                secret,
                secure_cookies: production,
                using_dev_secret,
            },
            cors_allowed_origins,
            logging,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

fn flag<G>(get: &G, name: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            name,
            value: other.to_string(),
        }),
    }
}
