//! In-memory template store using DashMap.
//!
//! Values live only for the lifetime of the process; used when Redis is not
//! configured and in tests.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::store::TemplateStore;
use super::types::StoreError;

/// In-memory template store keyed by `(bucket, field)`.
#[derive(Default)]
pub struct MemoryTemplateStore {
    fields: DashMap<(String, String), String>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored fields across all buckets
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn slot(bucket: &str, field: &str) -> (String, String) {
        (bucket.to_string(), field.to_string())
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, bucket: &str, field: &str) -> Result<bool, StoreError> {
        Ok(self.fields.contains_key(&Self::slot(bucket, field)))
    }

    async fn get(&self, bucket: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .fields
            .get(&Self::slot(bucket, field))
            .map(|value| value.clone()))
    }

    async fn set(&self, bucket: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.fields
            .insert(Self::slot(bucket, field), value.to_string());
        Ok(())
    }

    async fn set_if_absent(
        &self,
        bucket: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        match self.fields.entry(Self::slot(bucket, field)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(value.to_string());
                Ok(true)
            }
        }
    }
}
