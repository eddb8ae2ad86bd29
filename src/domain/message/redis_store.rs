//! Redis-backed template store
//!
//! Each bucket is a Redis hash; each template is one field of that hash.

use std::sync::Arc;

use async_trait::async_trait;

use crate::redis::pool::{RedisPool, RedisPoolExt};

use super::store::TemplateStore;
use super::types::StoreError;

pub struct RedisTemplateStore {
    pool: Arc<RedisPool>,
}

impl RedisTemplateStore {
    pub fn new(pool: Arc<RedisPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<RedisPool> {
        &self.pool
    }
}

#[async_trait]
impl TemplateStore for RedisTemplateStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn exists(&self, bucket: &str, field: &str) -> Result<bool, StoreError> {
        Ok(self.pool.hexists(bucket, field).await?)
    }

    async fn get(&self, bucket: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self.pool.hget(bucket, field).await?)
    }

    async fn set(&self, bucket: &str, field: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.pool.hset(bucket, field, value).await?)
    }

    /// HSETNX, so two processes registering the same key cannot both write.
    async fn set_if_absent(
        &self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let written = self.pool.hsetnx(bucket, field, value).await?;
        tracing::debug!(bucket = %bucket, field = %field, written, "HSETNX template default");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RedisConfig;
    use crate::redis::{CircuitBreaker, CircuitBreakerConfig, RedisHealth};

    #[tokio::test]
    async fn test_open_circuit_surfaces_as_store_error() {
        let cb = Arc::new(CircuitBreaker::with_config(CircuitBreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            reset_timeout_ms: 60_000,
        }));
        cb.record_failure();
        let pool = RedisPool::new(RedisConfig::default(), cb, Arc::new(RedisHealth::new())).unwrap();
        let store = RedisTemplateStore::new(Arc::new(pool));

        assert_eq!(store.backend_name(), "redis");
        let err = store.get("shared:Localization", "welcome").await.unwrap_err();
        assert!(err.to_string().contains("Circuit breaker is open"));
    }
}
