//! Rich text model.
//!
//! - `Component`: styled text tree with literal text replacement
//! - `MarkupProvider` / `TagMarkup`: markup string to `Component`
//! - `Audience`: identifiable viewer that receives rich text
//! - `PlatformHook`: optional host transforms around rendering

mod audience;
mod component;
mod markup;
mod platform;

pub use audience::Audience;
pub use component::{Component, Decoration, NamedColor, Style, TextColor};
pub use markup::{MarkupError, MarkupProvider, TagMarkup};
pub use platform::PlatformHook;
