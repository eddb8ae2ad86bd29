//! Template store factory

use std::sync::Arc;

use crate::config::LocalizationConfig;
use crate::redis::pool::RedisPool;

use super::memory_store::MemoryTemplateStore;
use super::redis_store::RedisTemplateStore;
use super::store::TemplateStore;

/// Create a template store based on configuration.
///
/// - `"redis"` (default): `RedisTemplateStore` if a pool is provided
/// - `"memory"`: `MemoryTemplateStore`
///
/// A Redis backend requested without a pool falls back to memory, which
/// keeps templates process-local.
pub fn create_template_store(
    settings: &LocalizationConfig,
    redis_pool: Option<Arc<RedisPool>>,
) -> Arc<dyn TemplateStore> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory template store");
            Arc::new(MemoryTemplateStore::new())
        }
        backend => {
            if backend != "redis" {
                tracing::warn!(backend = %backend, "Unknown template store backend, using redis");
            }
            match redis_pool {
                Some(pool) => {
                    tracing::info!(
                        backend = "redis",
                        url = %pool.url(),
                        bucket = %settings.bucket(),
                        "Creating Redis template store"
                    );
                    Arc::new(RedisTemplateStore::new(pool))
                }
                None => {
                    tracing::warn!(
                        "Redis template store requested but no pool provided, falling back to memory"
                    );
                    Arc::new(MemoryTemplateStore::new())
                }
            }
        }
    }
}
