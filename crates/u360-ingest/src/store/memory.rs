//! In-memory [`ObjectStore`] for tests and local dry runs

use super::{ObjectDescriptor, ObjectReader, ObjectStore};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;

#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    buckets: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
    failing: HashSet<String>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) -> Self {
        self.buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), body.into());
        self
    }

    /// Make `get` fail for `key`, as a dropped connection would.
    pub fn with_failing_object(mut self, bucket: &str, key: &str) -> Self {
        self = self.with_object(bucket, key, Vec::new());
        self.failing.insert(key.to_string());
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectDescriptor>> {
        let objects = self.buckets.get(bucket).ok_or_else(|| IngestError::ObjectStore {
            bucket: bucket.to_string(),
            message: "NoSuchBucket".to_string(),
        })?;

        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, body)| ObjectDescriptor::new(key.clone(), body.len() as u64))
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        let fetch_error = |message: &str| IngestError::Fetch {
            key: key.to_string(),
            message: message.to_string(),
        };

        if self.failing.contains(key) {
            return Err(fetch_error("connection reset"));
        }

        let body = self
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .ok_or_else(|| fetch_error("NoSuchKey"))?;

        Ok(Box::pin(Cursor::new(body.clone())))
    }
}
