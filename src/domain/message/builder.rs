//! Single-use render builder
//!
//! A builder accumulates substitutions over one template's text and renders
//! it once. Rendering writes the translated and substituted text back into
//! the builder, so a second render on the same builder starts from the
//! output of the first rather than from the original template.

use std::collections::HashMap;
use std::sync::Arc;

use crate::text::{Audience, Component, MarkupProvider, PlatformHook};

use super::context::RenderContext;
use super::legacy;
use super::types::LocalizationResult;

/// Value recorded for a placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement {
    /// Substituted into the markup before deserialization
    Text(String),
    /// Substituted into the rich text tree after deserialization
    Component(Component),
}

impl From<&str> for Replacement {
    fn from(value: &str) -> Self {
        Replacement::Text(value.to_string())
    }
}

impl From<String> for Replacement {
    fn from(value: String) -> Self {
        Replacement::Text(value)
    }
}

impl From<&String> for Replacement {
    fn from(value: &String) -> Self {
        Replacement::Text(value.clone())
    }
}

impl From<Component> for Replacement {
    fn from(value: Component) -> Self {
        Replacement::Component(value)
    }
}

pub struct MessageBuilder {
    current: String,
    provider: Arc<dyn MarkupProvider>,
    platform: Option<Arc<dyn PlatformHook>>,
    string_placeholders: HashMap<String, String>,
    component_placeholders: HashMap<String, Component>,
}

impl MessageBuilder {
    pub fn new(original: impl Into<String>, context: &RenderContext) -> Self {
        Self {
            current: original.into(),
            provider: context.provider().clone(),
            platform: context.platform().cloned(),
            string_placeholders: HashMap::new(),
            component_placeholders: HashMap::new(),
        }
    }

    /// Record a substitution for `placeholder`. A later call for the same
    /// placeholder and kind overwrites the earlier value.
    #[must_use]
    pub fn replace(
        mut self,
        placeholder: impl Into<String>,
        replacement: impl Into<Replacement>,
    ) -> Self {
        let placeholder = placeholder.into();
        match replacement.into() {
            Replacement::Text(value) => {
                self.string_placeholders.insert(placeholder, value);
            }
            Replacement::Component(value) => {
                self.component_placeholders.insert(placeholder, value);
            }
        }
        self
    }

    /// Text the builder currently holds
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Render to markup.
    ///
    /// With a platform hook the hook expands the raw text and the recorded
    /// string placeholders are not applied. Without one, legacy codes are
    /// translated and string placeholders are substituted literally, in no
    /// particular order; overlapping placeholder tokens give unspecified
    /// results.
    pub fn to_markup_string(&mut self, viewer: Option<&dyn Audience>) -> String {
        if let Some(platform) = &self.platform {
            return platform.expand_placeholders(viewer, &self.current);
        }

        if legacy::contains_legacy(&self.current) {
            self.current = legacy::translate(&self.current);
        }

        for (placeholder, value) in &self.string_placeholders {
            self.current = self.current.replace(placeholder.as_str(), value);
        }

        self.current.clone()
    }

    /// Render to rich text, applying component placeholders after markup
    /// deserialization.
    pub fn to_rich_text(&mut self, viewer: Option<&dyn Audience>) -> LocalizationResult<Component> {
        let markup = self.to_markup_string(viewer);
        let mut component = self.provider.deserialize(&markup)?;

        for (placeholder, value) in &self.component_placeholders {
            component = component.replace_text(placeholder, value);
        }

        if let Some(platform) = &self.platform {
            component = platform.post_process(viewer, component);
        }

        Ok(component)
    }

    /// Render for `recipient` and deliver it.
    pub fn send(&mut self, recipient: &dyn Audience) -> LocalizationResult<()> {
        let component = self.to_rich_text(Some(recipient))?;
        recipient.send_message(component);
        Ok(())
    }
}
