//! Template store trait definition

use async_trait::async_trait;

use super::types::StoreError;

/// Shared hash-like store holding the authoritative template text.
///
/// `bucket` names the hash, `field` is the template key.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Backend name for logs
    fn backend_name(&self) -> &'static str;

    async fn exists(&self, bucket: &str, field: &str) -> Result<bool, StoreError>;

    async fn get(&self, bucket: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, bucket: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` only when `field` is absent. Returns true when written.
    ///
    /// The default is a check followed by a write; backends with an atomic
    /// primitive should override it.
    async fn set_if_absent(
        &self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        if self.exists(bucket, field).await? {
            return Ok(false);
        }
        self.set(bucket, field, value).await?;
        Ok(true)
    }
}
