//! Shared message templates.
//!
//! This module provides:
//! - Template registration against a shared store (write-if-absent)
//! - A process-local TTL cache with single-flight loads
//! - A render builder for string and rich text placeholders
//! - Legacy `&`-code translation
//!
//! # Example
//!
//! ```ignore
//! let store = create_template_store(&settings.localization, Some(pool));
//! let registry = MessageRegistry::new(store, &settings.localization, RenderContext::default());
//!
//! let welcome = registry
//!     .register("welcome", ["<gold>Welcome, <name>!", "<gray>Enjoy your stay."])
//!     .await?;
//!
//! welcome
//!     .create()
//!     .await
//!     .replace("<name>", player.name())
//!     .send(&player)?;
//! ```

mod builder;
mod cache;
mod context;
mod factory;
pub mod legacy;
mod memory_store;
mod redis_store;
mod registry;
mod store;
mod types;

pub use builder::{MessageBuilder, Replacement};
pub use cache::{CacheEntry, TemplateCache, DEFAULT_TTL};
pub use context::RenderContext;
pub use factory::create_template_store;
pub use memory_store::MemoryTemplateStore;
pub use redis_store::RedisTemplateStore;
pub use registry::{MessageRegistry, Template};
pub use store::TemplateStore;
pub use types::{join_lines, LocalizationError, LocalizationResult, StoreError, LINE_SEPARATOR};
