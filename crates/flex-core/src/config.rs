//! Configuration types and loading
//!
//! All settings come from the environment (optionally seeded from a `.env` file by the
//! binary). The resulting `AppConfig` is passed explicitly to whatever needs it.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Database configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Authentication configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub pool_timeout_seconds: u64,
    pub storage: StorageBackend,
}

/// Which directory implementation backs the service
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS (the browser client)
    pub client_origin: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// Token lifetime in seconds
    pub jwt_expiry_seconds: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgres://localhost:5432/flex-api".to_string(),
                pool_size: 10,
                pool_timeout_seconds: 5,
                storage: StorageBackend::Postgres,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                client_origin: "http://localhost:3000".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: String::new(),
                jwt_expiry_seconds: 7 * 24 * 60 * 60, // 7d
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Database
        if let Some(url) = lookup("DATABASE_URL") {
            config.database.url = url;
        }
        if let Some(size) = lookup("DATABASE_POOL_SIZE") {
            config.database.pool_size = parse_value("DATABASE_POOL_SIZE", &size)?;
        }
        if let Some(storage) = lookup("STORAGE") {
            config.database.storage = match storage.as_str() {
                "postgres" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "STORAGE".into(),
                        message: format!("expected postgres or memory, got {other}"),
                    })
                }
            };
        }

        // Server
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse_value("PORT", &port)?;
        }
        if let Some(origin) = lookup("CLIENT_ORIGIN") {
            config.server.client_origin = origin;
        }

        // Auth
        config.auth.jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".into()))?;
        if let Some(expiry) = lookup("JWT_EXPIRY") {
            config.auth.jwt_expiry_seconds =
                parse_duration_seconds(&expiry).ok_or_else(|| ConfigError::InvalidValue {
                    key: "JWT_EXPIRY".into(),
                    message: format!("expected seconds or a 30s/15m/12h/7d duration, got {expiry}"),
                })?;
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Parse `"3600"`, `"30s"`, `"15m"`, `"12h"` or `"7d"` into seconds
pub fn parse_duration_seconds(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (digits, multiplier) = match raw.chars().last()? {
        's' => (&raw[..raw.len() - 1], 1),
        'm' => (&raw[..raw.len() - 1], 60),
        'h' => (&raw[..raw.len() - 1], 60 * 60),
        'd' => (&raw[..raw.len() - 1], 24 * 60 * 60),
        _ => (raw, 1),
    };
    let value: i64 = digits.parse().ok()?;
    if value <= 0 {
        return None;
    }
    value.checked_mul(multiplier)
}
