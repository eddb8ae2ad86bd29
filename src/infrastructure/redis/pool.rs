//! Redis connection pool for the shared template store.
//!
//! Provides a managed multiplexed connection with circuit breaker
//! integration, so a Redis outage turns into fast load failures instead of
//! stalled template lookups.

use std::sync::Arc;

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::sync::RwLock;

use crate::config::RedisConfig;

use super::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RedisHealth};

/// Error type for Redis pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Circuit breaker is open")]
    CircuitOpen,

    #[error("Redis {operation} timed out after {after_ms}ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },
}

/// Redis connection pool for hash operations.
///
/// A single multiplexed connection is shared across tasks and re-established
/// lazily after it drops.
pub struct RedisPool {
    client: Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    circuit_breaker: Arc<CircuitBreaker>,
    health: Arc<RedisHealth>,
    config: RedisConfig,
}

impl RedisPool {
    pub fn new(
        config: RedisConfig,
        circuit_breaker: Arc<CircuitBreaker>,
        health: Arc<RedisHealth>,
    ) -> Result<Self, PoolError> {
        let client = Client::open(config.url.as_str())?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            circuit_breaker,
            health,
            config,
        })
    }

    /// Build a pool with a circuit breaker tuned from the Redis settings.
    pub fn from_config(config: RedisConfig) -> Result<Self, PoolError> {
        let breaker = CircuitBreaker::with_config(CircuitBreakerConfig::from(&config));
        Self::new(config, Arc::new(breaker), Arc::new(RedisHealth::new()))
    }

    /// Get the shared connection, connecting on first use.
    pub async fn get_connection(&self) -> Result<MultiplexedConnection, PoolError> {
        if !self.circuit_breaker.allow_request() {
            self.health.set_circuit_open();
            return Err(PoolError::CircuitOpen);
        }

        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        self.connect().await
    }

    async fn connect(&self) -> Result<MultiplexedConnection, PoolError> {
        let mut conn_guard = self.connection.write().await;

        // Another task may have connected while we waited for the write lock
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        self.health.set_reconnecting();

        let timeout = self.config.connection_timeout();
        let connecting = self.client.get_multiplexed_tokio_connection();
        let Ok(connected) = tokio::time::timeout(timeout, connecting).await else {
            self.circuit_breaker.record_failure();
            tracing::error!(
                timeout_ms = self.config.connection_timeout_ms,
                "Timed out connecting to template store"
            );
            return Err(PoolError::Timeout {
                operation: "connect",
                after_ms: self.config.connection_timeout_ms,
            });
        };

        match connected {
            Ok(conn) => {
                *conn_guard = Some(conn.clone());
                self.circuit_breaker.record_success();
                self.health.set_connected();
                tracing::info!(url = %self.config.url, "Template store connection established");
                Ok(conn)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                tracing::error!(error = %e, "Failed to connect to template store");
                Err(PoolError::Redis(e))
            }
        }
    }

    /// Run a command with circuit breaker bookkeeping, bounded by the
    /// response timeout.
    pub async fn execute<F, T, Fut>(&self, f: F) -> Result<T, PoolError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: std::future::Future<Output = RedisResult<T>>,
    {
        let conn = self.get_connection().await?;

        match tokio::time::timeout(self.config.response_timeout(), f(conn)).await {
            Ok(Ok(result)) => {
                self.circuit_breaker.record_success();
                Ok(result)
            }
            Ok(Err(e)) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    self.drop_connection().await;
                }
                self.circuit_breaker.record_failure();
                Err(PoolError::Redis(e))
            }
            Err(_) => {
                // A silent peer usually means the connection is gone
                self.drop_connection().await;
                self.circuit_breaker.record_failure();
                tracing::warn!(
                    timeout_ms = self.config.response_timeout_ms,
                    "Template store command timed out"
                );
                Err(PoolError::Timeout {
                    operation: "command",
                    after_ms: self.config.response_timeout_ms,
                })
            }
        }
    }

    async fn drop_connection(&self) {
        let mut conn_guard = self.connection.write().await;
        *conn_guard = None;
        self.health.set_reconnecting();
    }

    pub fn is_healthy(&self) -> bool {
        self.health.is_healthy() && self.circuit_breaker.state() == CircuitState::Closed
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

/// Hash commands used by the template store.
#[async_trait::async_trait]
pub trait RedisPoolExt {
    /// Check whether a hash field exists.
    async fn hexists(&self, key: &str, field: &str) -> Result<bool, PoolError>;

    /// Get a hash field.
    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, PoolError>;

    /// Set a hash field, overwriting any previous value.
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), PoolError>;

    /// Set a hash field only if it is absent. Returns true when written.
    async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, PoolError>;
}

#[async_trait::async_trait]
impl RedisPoolExt for RedisPool {
    async fn hexists(&self, key: &str, field: &str) -> Result<bool, PoolError> {
        self.execute(|mut conn| async move { conn.hexists::<_, _, bool>(key, field).await })
            .await
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, PoolError> {
        self.execute(|mut conn| async move {
            conn.hget::<_, _, Option<String>>(key, field).await
        })
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), PoolError> {
        self.execute(|mut conn| async move { conn.hset::<_, _, _, ()>(key, field, value).await })
            .await
    }

    async fn hsetnx(&self, key: &str, field: &str, value: &str) -> Result<bool, PoolError> {
        self.execute(|mut conn| async move {
            conn.hset_nx::<_, _, _, bool>(key, field, value).await
        })
        .await
    }
}
