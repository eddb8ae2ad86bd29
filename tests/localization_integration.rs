//! Cross-component integration tests
//!
//! Registry, cache, store and builder wired together the way a server
//! process uses them, without requiring an actual Redis.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use shared_localization::config::{LocalizationConfig, RedisConfig};
use shared_localization::message::{
    legacy, MemoryTemplateStore, MessageRegistry, RedisTemplateStore, RenderContext, StoreError,
    TemplateCache, TemplateStore,
};
use shared_localization::redis::pool::RedisPool;
use shared_localization::text::{
    Audience, Component, Decoration, MarkupError, MarkupProvider, PlatformHook, Style,
};

const BUCKET: &str = "shared:Localization";

/// Memory store wrapper that counts reads and can simulate an outage
struct FlakyStore {
    inner: MemoryTemplateStore,
    gets: AtomicUsize,
    down: AtomicBool,
    get_delay: Duration,
}

impl FlakyStore {
    fn new(get_delay: Duration) -> Self {
        Self {
            inner: MemoryTemplateStore::new(),
            gets: AtomicUsize::new(0),
            down: AtomicBool::new(false),
            get_delay,
        }
    }

    fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TemplateStore for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn exists(&self, bucket: &str, field: &str) -> Result<bool, StoreError> {
        self.check()?;
        self.inner.exists(bucket, field).await
    }

    async fn get(&self, bucket: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if !self.get_delay.is_zero() {
            tokio::time::sleep(self.get_delay).await;
        }
        self.check()?;
        self.inner.get(bucket, field).await
    }

    async fn set(&self, bucket: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(bucket, field, value).await
    }
}

struct Recorder {
    id: String,
    received: Mutex<Vec<Component>>,
}

impl Recorder {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            received: Mutex::new(Vec::new()),
        }
    }
}

impl Audience for Recorder {
    fn id(&self) -> &str {
        &self.id
    }

    fn send_message(&self, message: Component) {
        self.received.lock().unwrap().push(message);
    }
}

fn registry_with(store: Arc<FlakyStore>, ttl: Duration) -> MessageRegistry {
    let cache = Arc::new(TemplateCache::with_ttl(store.clone(), BUCKET, ttl));
    MessageRegistry::with_cache(store, cache, RenderContext::default())
}

// =============================================================================
// Cache behavior
// =============================================================================

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_template_reads_without_remote_calls() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store.clone(), Duration::from_secs(1800));

        let template = registry.register("welcome", ["Hello"]).await.unwrap();
        let before = store.gets();

        for _ in 0..10 {
            assert_eq!(template.content().await, "Hello");
        }
        assert_eq!(store.gets(), before);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_after_expiry_load_once() {
        let store = Arc::new(FlakyStore::new(Duration::from_millis(30)));
        let registry = registry_with(store.clone(), Duration::from_millis(20));

        let template = registry.register("welcome", ["Hello"]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let before = store.gets();

        let reads = (0..12).map(|_| template.content());
        let contents = futures::future::join_all(reads).await;

        assert!(contents.iter().all(|c| c == "Hello"));
        assert_eq!(store.gets() - before, 1);
    }

    #[tokio::test]
    async fn test_remote_edit_visible_after_expiry() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store.clone(), Duration::from_millis(20));

        let template = registry.register("motd", ["old"]).await.unwrap();
        store.inner.set(BUCKET, "motd", "new").await.unwrap();

        // Still within the TTL window
        assert_eq!(template.content().await, "old");

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(template.content().await, "new");
    }
}

// =============================================================================
// Registration
// =============================================================================

mod registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_stores_lines_joined() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store.clone(), Duration::from_secs(1800));

        registry.register("k", ["a", "b"]).await.unwrap();

        let stored = store.inner.get(BUCKET, "k").await.unwrap();
        assert_eq!(stored.as_deref(), Some("a<newline>b"));
    }

    #[tokio::test]
    async fn test_second_registration_never_overwrites() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store.clone(), Duration::from_secs(1800));

        registry.register("k", ["first"]).await.unwrap();
        let again = registry.register("k", ["second"]).await.unwrap();

        let stored = store.inner.get(BUCKET, "k").await.unwrap();
        assert_eq!(stored.as_deref(), Some("first"));
        assert_eq!(again.content().await, "first");
    }

    #[tokio::test]
    async fn test_registration_failure_is_fatal() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        store.set_down(true);
        let registry = registry_with(store.clone(), Duration::from_secs(1800));

        let result = registry.register("k", ["x"]).await;
        assert!(result.is_err());
        assert!(registry.get("k").is_none());
    }

    #[tokio::test]
    async fn test_other_process_sees_registered_value() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let server_a = registry_with(store.clone(), Duration::from_secs(1800));
        let server_b = registry_with(store.clone(), Duration::from_secs(1800));

        server_a.register("shared", ["from a"]).await.unwrap();
        let on_b = server_b.register("shared", ["from b"]).await.unwrap();

        assert_eq!(on_b.content().await, "from a");
    }
}

// =============================================================================
// Fallback
// =============================================================================

mod fallback_tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_default() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store.clone(), Duration::from_millis(10));

        let template = registry.register("k", ["X"]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.set_down(true);

        assert_eq!(template.content().await, "X");

        store.set_down(false);
        assert_eq!(template.content().await, "X");
    }

    #[tokio::test]
    async fn test_fallback_uses_default_not_edited_value() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        store.inner.set(BUCKET, "k", "edited").await.unwrap();
        let registry = registry_with(store.clone(), Duration::from_millis(10));

        let template = registry.register("k", ["default"]).await.unwrap();
        assert_eq!(template.content().await, "edited");

        tokio::time::sleep(Duration::from_millis(30)).await;
        store.set_down(true);
        assert_eq!(template.content().await, "default");
    }

    #[tokio::test]
    async fn test_silent_redis_host_falls_back_within_timeout() {
        let config = RedisConfig {
            url: "redis://10.255.255.1:6379".to_string(),
            connection_timeout_ms: 100,
            response_timeout_ms: 100,
            ..Default::default()
        };
        let pool = Arc::new(RedisPool::from_config(config).unwrap());
        let redis: Arc<dyn TemplateStore> = Arc::new(RedisTemplateStore::new(pool));

        // Registration goes to a reachable store; later reloads hit the silent host
        let seed: Arc<dyn TemplateStore> = Arc::new(MemoryTemplateStore::new());
        let cache = Arc::new(TemplateCache::with_ttl(redis, BUCKET, Duration::from_millis(10)));
        let registry = MessageRegistry::with_cache(seed, cache, RenderContext::default());

        let template = registry.register("k", ["default"]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let content = tokio::time::timeout(Duration::from_secs(5), template.content())
            .await
            .expect("content() must not hang on an unresponsive store");
        assert_eq!(content, "default");
    }
}

// =============================================================================
// Rendering
// =============================================================================

mod render_tests {
    use super::*;

    /// Provider that upper-cases everything, to check per-call swapping
    struct Shouting;

    impl MarkupProvider for Shouting {
        fn deserialize(&self, input: &str) -> Result<Component, MarkupError> {
            Ok(Component::text(input.to_uppercase()))
        }
    }

    struct IconHook;

    impl PlatformHook for IconHook {
        fn expand_placeholders(&self, viewer: Option<&dyn Audience>, text: &str) -> String {
            text.replace("%player_name%", viewer.map(|v| v.id()).unwrap_or("?"))
        }

        fn post_process(&self, _viewer: Option<&dyn Audience>, component: Component) -> Component {
            component.replace_text(":coin:", &Component::text("\u{26c3}"))
        }
    }

    #[test]
    fn test_legacy_translation() {
        assert_eq!(legacy::translate("&cHello&r"), "<red>Hello<reset>");
        assert_eq!(legacy::translate("no codes here"), "no codes here");
    }

    #[tokio::test]
    async fn test_full_render_and_send() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store, Duration::from_secs(1800));
        let template = registry
            .register("balance", ["&aBalance:", "<bold><amount></bold> coins"])
            .await
            .unwrap();

        let amount = Component::styled("42", Style::decorated(Decoration::Underlined));
        let player = Recorder::new("steve");

        template
            .create()
            .await
            .replace("<amount>", amount)
            .send(&player)
            .unwrap();

        let received = player.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].plain_text(), "Balance:\n42 coins");

        let (_, style) = received[0].find_text("42").unwrap();
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.underlined, Some(true));
        assert!(style.color.is_some());
    }

    #[tokio::test]
    async fn test_create_with_custom_provider() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store, Duration::from_secs(1800));
        let template = registry.register("hi", ["hi <name>"]).await.unwrap();

        let mut builder = template
            .create_with(Arc::new(Shouting))
            .await
            .replace("<name>", "ann");

        assert_eq!(builder.to_rich_text(None).unwrap().plain_text(), "HI ANN");
    }

    #[tokio::test]
    async fn test_platform_hook_from_context() {
        let store: Arc<dyn TemplateStore> = Arc::new(MemoryTemplateStore::new());
        let context = RenderContext::default().with_platform(Arc::new(IconHook));
        let registry = MessageRegistry::new(store, &LocalizationConfig::default(), context);

        let template = registry
            .register("pay", ["%player_name% paid you 5 :coin:"])
            .await
            .unwrap();
        let viewer = Recorder::new("alex");

        let mut builder = template.create().await;
        let component = builder.to_rich_text(Some(&viewer)).unwrap();

        assert_eq!(component.plain_text(), "alex paid you 5 \u{26c3}");
    }

    #[tokio::test]
    async fn test_malformed_markup_reaches_caller() {
        let store = Arc::new(FlakyStore::new(Duration::ZERO));
        let registry = registry_with(store, Duration::from_secs(1800));
        let template = registry.register("bad", ["<red>oops</blue>"]).await.unwrap();

        let player = Recorder::new("p");
        let result = template.create().await.send(&player);

        assert!(result.is_err());
        assert!(player.received.lock().unwrap().is_empty());
    }
}
