//! Message error types and shared constants

use thiserror::Error;

use crate::redis::pool::PoolError;
use crate::text::MarkupError;

/// Token used instead of a raw line feed inside stored templates
pub const LINE_SEPARATOR: &str = "<newline>";

/// Error type for template lookup and rendering.
///
/// `Clone` so one in-flight load result can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalizationError {
    #[error("Template store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid markup: {0}")]
    Deserialize(#[from] MarkupError),
}

/// Result type for localization operations
pub type LocalizationResult<T> = Result<T, LocalizationError>;

/// Error type for template store backends
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Pool(#[from] PoolError),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for LocalizationError {
    fn from(err: StoreError) -> Self {
        LocalizationError::RemoteUnavailable(err.to_string())
    }
}

/// Join default lines into one stored value
pub fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}
