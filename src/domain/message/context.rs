//! Render configuration handed to templates and builders

use std::sync::Arc;

use crate::text::{MarkupProvider, PlatformHook, TagMarkup};

/// Markup provider and optional platform hook used for rendering.
///
/// Built once at startup and injected into the registry; cloning only
/// clones the handles.
#[derive(Clone)]
pub struct RenderContext {
    provider: Arc<dyn MarkupProvider>,
    platform: Option<Arc<dyn PlatformHook>>,
}

impl RenderContext {
    pub fn new(provider: Arc<dyn MarkupProvider>) -> Self {
        Self {
            provider,
            platform: None,
        }
    }

    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn MarkupProvider>) -> Self {
        self.provider = provider;
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: Arc<dyn PlatformHook>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn provider(&self) -> &Arc<dyn MarkupProvider> {
        &self.provider
    }

    pub fn platform(&self) -> Option<&Arc<dyn PlatformHook>> {
        self.platform.as_ref()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Arc::new(TagMarkup::new()))
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("platform", &self.platform.is_some())
            .finish_non_exhaustive()
    }
}
