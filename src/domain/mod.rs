//! Domain layer
//!
//! - `message`: template registration, caching and rendering
//! - `text`: rich text model and markup

pub mod message;
pub mod text;
