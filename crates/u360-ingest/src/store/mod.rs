//! Object store boundary
//!
//! The pipeline only needs two calls: enumerate the objects under a prefix
//! and open one object as a buffered byte stream. Failures of either are
//! fatal to the run; nothing here retries.

use crate::error::Result;
use async_trait::async_trait;
use std::pin::Pin;
use tokio::io::AsyncBufRead;

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::{S3ObjectStore, S3Settings};

/// Streaming body of one object.
pub type ObjectReader = Pin<Box<dyn AsyncBufRead + Send>>;

/// One listed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub key: String,
    pub size: u64,
}

impl ObjectDescriptor {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Every object in `bucket` whose key starts with `prefix`, in key order.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectDescriptor>>;

    /// Open `key` for streaming.
    async fn get(&self, bucket: &str, key: &str) -> Result<ObjectReader>;
}
