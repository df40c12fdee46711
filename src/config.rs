// Service configuration loaded from environment variables

use jsonwebtoken::Algorithm;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors raised while reading the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),

    #[error("environment variable {name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// HTTP listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Database server hostname
    pub server: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// Fixed wait between pool construction attempts
    pub retry_interval: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .field("retry_interval", &self.retry_interval)
            .finish()
    }
}

/// Access token signing configuration
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub lifetime: chrono::Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub token: TokenConfig,
}

impl AppConfig {
    /// Read configuration from the process environment
    ///
    /// Expected environment variables:
    /// - `HOST` / `PORT`: listener address (default: 0.0.0.0:8080)
    /// - `DATABASE_SERVER`, `DATABASE_NAME`, `DATABASE_USERNAME`, `DATABASE_PASSWORD`: required
    /// - `DATABASE_PORT`: default 3306
    /// - `DATABASE_POOL_SIZE`: default 3
    /// - `DATABASE_RETRY_INTERVAL_SECS`: default 5
    /// - `ACCESS_TOKEN_SECRET_KEY`, `ACCESS_TOKEN_ALGORITHM`, `ACCESS_TOKEN_ISSUER`: required
    /// - `ACCESS_TOKEN_EXPIRATION_TIME`: required, token lifetime in minutes
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let server = ServerConfig {
            host: vars.optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: vars.parsed_or("PORT", 8080)?,
        };

        let database = DatabaseConfig {
            server: vars.required("DATABASE_SERVER")?,
            port: vars.parsed_or("DATABASE_PORT", 3306)?,
            name: vars.required("DATABASE_NAME")?,
            username: vars.required("DATABASE_USERNAME")?,
            password: vars.required("DATABASE_PASSWORD")?,
            pool_size: vars.parsed_or("DATABASE_POOL_SIZE", 3)?,
            retry_interval: Duration::from_secs(vars.parsed_or("DATABASE_RETRY_INTERVAL_SECS", 5)?),
        };
        if database.pool_size == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_POOL_SIZE",
                reason: "pool size must be at least 1".to_string(),
            });
        }
        if database.retry_interval.is_zero() {
            return Err(ConfigError::Invalid {
                name: "DATABASE_RETRY_INTERVAL_SECS",
                reason: "retry interval must be at least 1 second".to_string(),
            });
        }

        let token = TokenConfig {
            secret: vars.required("ACCESS_TOKEN_SECRET_KEY")?,
            algorithm: parse_algorithm(&vars.required("ACCESS_TOKEN_ALGORITHM")?)?,
            issuer: vars.required("ACCESS_TOKEN_ISSUER")?,
            lifetime: parse_lifetime(&vars.required("ACCESS_TOKEN_EXPIRATION_TIME")?)?,
        };
        if token.secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: "ACCESS_TOKEN_SECRET_KEY",
                reason: "signing secret must not be empty".to_string(),
            });
        }

        Ok(Self {
            server,
            database,
            token,
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

/// Only HMAC algorithms are usable with a shared secret
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: "ACCESS_TOKEN_ALGORITHM",
        reason: e.to_string(),
    })?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::Invalid {
            name: "ACCESS_TOKEN_ALGORITHM",
            reason: format!("{:?} is not a symmetric algorithm", other),
        }),
    }
}

/// Lifetime is given in minutes and may be fractional, but must cover at least one second
fn parse_lifetime(raw: &str) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "ACCESS_TOKEN_EXPIRATION_TIME",
        reason,
    };

    let minutes: f64 = raw.trim().parse().map_err(|e: std::num::ParseFloatError| invalid(e.to_string()))?;
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(invalid("lifetime must be a positive number of minutes".to_string()));
    }

    let lifetime = chrono::Duration::milliseconds((minutes * 60_000.0).round() as i64);
    if lifetime < chrono::Duration::seconds(1) {
        return Err(invalid("lifetime must be at least one second".to_string()));
    }

    Ok(lifetime)
}
