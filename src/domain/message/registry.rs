//! Template registration and lookup

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::LocalizationConfig;
use crate::metrics::TemplateMetrics;
use crate::text::MarkupProvider;

use super::builder::MessageBuilder;
use super::cache::TemplateCache;
use super::context::RenderContext;
use super::store::TemplateStore;
use super::types::{join_lines, LocalizationError, LocalizationResult};

/// A registered message template.
///
/// Holds the compiled-in default and reads its live text through the shared
/// cache.
#[derive(Clone)]
pub struct Template {
    key: String,
    default_content: String,
    cache: Arc<TemplateCache>,
    context: RenderContext,
}

impl Template {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_content(&self) -> &str {
        &self.default_content
    }

    /// Live text for this template, or the default when it cannot be
    /// obtained. Never fails.
    pub async fn content(&self) -> String {
        match self.cache.get(&self.key).await {
            Ok(content) => content,
            Err(e) => {
                TemplateMetrics::record_fallback();
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to fetch template, using default content"
                );
                self.default_content.clone()
            }
        }
    }

    /// Open a builder over the current content with the registry's provider.
    pub async fn create(&self) -> MessageBuilder {
        MessageBuilder::new(self.content().await, &self.context)
    }

    /// Open a builder that deserializes with `provider` instead.
    pub async fn create_with(&self, provider: Arc<dyn MarkupProvider>) -> MessageBuilder {
        let context = self.context.clone().with_provider(provider);
        MessageBuilder::new(self.content().await, &context)
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("key", &self.key)
            .field("default_content", &self.default_content)
            .finish_non_exhaustive()
    }
}

/// Registers templates against the shared store and hands them out.
pub struct MessageRegistry {
    store: Arc<dyn TemplateStore>,
    cache: Arc<TemplateCache>,
    context: RenderContext,
    templates: DashMap<String, Template>,
}

impl MessageRegistry {
    pub fn new(
        store: Arc<dyn TemplateStore>,
        config: &LocalizationConfig,
        context: RenderContext,
    ) -> Self {
        let ttl = std::time::Duration::from_secs(config.cache_ttl_seconds);
        let cache = TemplateCache::with_ttl(store.clone(), config.bucket(), ttl);
        Self::with_cache(store, Arc::new(cache), context)
    }

    /// Build around an existing cache (which decides the bucket and TTL).
    pub fn with_cache(
        store: Arc<dyn TemplateStore>,
        cache: Arc<TemplateCache>,
        context: RenderContext,
    ) -> Self {
        Self {
            store,
            cache,
            context,
            templates: DashMap::new(),
        }
    }

    /// Register `key` with its default lines.
    ///
    /// Writes the default only if the store has no value for `key`, then
    /// reads back whatever is stored and seeds the cache with it. Store
    /// failures are returned: a template that could not be registered must
    /// not be used.
    pub async fn register<I, S>(&self, key: &str, default_lines: I) -> LocalizationResult<Template>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let default_content = join_lines(default_lines);
        let bucket = self.cache.bucket();

        let written = self
            .store
            .set_if_absent(bucket, key, &default_content)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "Failed to write template default");
                LocalizationError::from(e)
            })?;

        let stored = self
            .store
            .get(bucket, key)
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "Failed to read back template");
                LocalizationError::from(e)
            })?
            .ok_or_else(|| {
                tracing::error!(key = %key, "Template missing right after registration");
                LocalizationError::NotFound(key.to_string())
            })?;

        self.cache.insert(key, stored);
        TemplateMetrics::record_registered(written);

        let template = Template {
            key: key.to_string(),
            default_content,
            cache: self.cache.clone(),
            context: self.context.clone(),
        };
        self.templates.insert(key.to_string(), template.clone());

        tracing::info!(
            key = %key,
            bucket = %bucket,
            default_written = written,
            "Template registered"
        );

        Ok(template)
    }

    pub fn get(&self, key: &str) -> Option<Template> {
        self.templates.get(key).map(|t| t.clone())
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.templates.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MemoryTemplateStore;

    fn registry(store: Arc<MemoryTemplateStore>) -> MessageRegistry {
        MessageRegistry::new(store, &LocalizationConfig::default(), RenderContext::default())
    }

    #[tokio::test]
    async fn test_register_writes_joined_default() {
        let store = Arc::new(MemoryTemplateStore::new());
        let registry = registry(store.clone());

        let template = registry.register("motd", ["a", "b"]).await.unwrap();

        assert_eq!(template.default_content(), "a<newline>b");
        let stored = store.get("shared:Localization", "motd").await.unwrap();
        assert_eq!(stored.as_deref(), Some("a<newline>b"));
        assert_eq!(registry.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_register_keeps_existing_remote_value() {
        let store = Arc::new(MemoryTemplateStore::new());
        store
            .set("shared:Localization", "motd", "<gold>edited")
            .await
            .unwrap();
        let registry = registry(store.clone());

        let template = registry.register("motd", ["default"]).await.unwrap();

        assert_eq!(template.content().await, "<gold>edited");
        assert_eq!(template.default_content(), "default");
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let registry = registry(Arc::new(MemoryTemplateStore::new()));
        registry.register("b.key", ["x"]).await.unwrap();
        registry.register("a.key", ["y"]).await.unwrap();

        assert_eq!(registry.keys(), vec!["a.key".to_string(), "b.key".to_string()]);
        assert_eq!(registry.get("a.key").unwrap().key(), "a.key");
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_create_renders_current_content() {
        let registry = registry(Arc::new(MemoryTemplateStore::new()));
        let template = registry.register("greet", ["Hi <name>!"]).await.unwrap();

        let mut builder = template.create().await.replace("<name>", "Ann");
        assert_eq!(builder.to_markup_string(None), "Hi Ann!");
    }
}
