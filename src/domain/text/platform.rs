//! Host-provided, viewer-aware text transforms

use super::audience::Audience;
use super::component::Component;

/// Optional hook supplied by the hosting platform.
///
/// When a hook is configured it owns placeholder expansion entirely: the
/// builder hands it the raw template text and skips its own string
/// placeholders and legacy translation.
pub trait PlatformHook: Send + Sync {
    /// Expand viewer-specific placeholders in raw markup.
    fn expand_placeholders(&self, viewer: Option<&dyn Audience>, text: &str) -> String;

    /// Final pass over the rendered tree (custom glyphs, icons, ...).
    fn post_process(&self, viewer: Option<&dyn Audience>, component: Component) -> Component;
}
