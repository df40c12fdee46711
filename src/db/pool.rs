// Connection pool construction with retry-until-healthy startup semantics

use crate::config::DatabaseConfig;
use crate::db::error::describe_failure;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;

/// Type alias for the MySQL connection pool
pub type DbPool = MySqlPool;

/// Something that can build a ready-to-use connection pool
#[async_trait]
pub trait PoolConnector: Send + Sync {
    type Pool: Send;

    async fn connect(&self) -> Result<Self::Pool, sqlx::Error>;
}

/// Builds MySQL pools from the service's database configuration
pub struct MySqlConnector {
    options: MySqlConnectOptions,
    max_connections: u32,
}

impl MySqlConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.server)
            .port(config.port)
            .database(&config.name)
            .username(&config.username)
            .password(&config.password);

        Self {
            options,
            max_connections: config.pool_size,
        }
    }
}

#[async_trait]
impl PoolConnector for MySqlConnector {
    type Pool = DbPool;

    /// Creates the pool and opens its first connection eagerly, so a returned
    /// pool has already reached the server
    async fn connect(&self) -> Result<DbPool, sqlx::Error> {
        tracing::debug!("Creating database connection pool");

        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(self.options.clone())
            .await?;

        tracing::info!("Database connection pool created successfully");
        Ok(pool)
    }
}

/// Obtains a pool at startup, retrying with a fixed backoff until it succeeds
pub struct PoolManager<C> {
    connector: C,
    retry_interval: Duration,
}

impl<C: PoolConnector> PoolManager<C> {
    pub fn new(connector: C, retry_interval: Duration) -> Self {
        Self {
            connector,
            retry_interval,
        }
    }

    /// Block until a pool is available
    ///
    /// Construction failures are logged and retried forever; this never
    /// returns an error. Call once, before accepting requests.
    pub async fn acquire_pool(&self) -> C::Pool {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.connector.connect().await {
                Ok(pool) => {
                    tracing::info!(attempt, "Connected to database");
                    return pool;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        retry_in_secs = self.retry_interval.as_secs_f64(),
                        "Failed to create database pool: {}",
                        describe_failure(&e)
                    );
                    tokio::time::sleep(self.retry_interval).await;
                }
            }
        }
    }
}
