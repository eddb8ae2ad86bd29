//! Viewers and recipients of rendered messages

use super::component::Component;

/// Something that can be identified by viewer-aware hooks and can receive
/// rich text.
pub trait Audience: Send + Sync {
    /// Stable identifier handed to platform hooks (player UUID, session id, ...)
    fn id(&self) -> &str;

    /// Deliver a rendered message. Delivery failures are the sink's concern.
    fn send_message(&self, message: Component);
}
