//! Bulk-load boundary
//!
//! A [`BulkLoader`] accepts facts from many load workers at once, buffers
//! them as it sees fit and must have written everything it accepted once
//! [`close`](BulkLoader::close) returns `Ok`.

use crate::dimensions::FrameSpec;
use crate::error::Result;
use crate::facts::Fact;
use async_trait::async_trait;

pub mod memory;
pub mod pilosa;

pub use memory::{LoadedFact, MemoryLoader};
pub use pilosa::PilosaLoader;

#[async_trait]
pub trait BulkLoader: Send + Sync {
    /// Create the index and every frame in `schema`. Frames that already
    /// exist are left untouched.
    async fn provision(&self, schema: &[FrameSpec]) -> Result<()>;

    async fn add_bit(&self, dimension: &str, column: u64, row: u64) -> Result<()>;

    async fn add_value(&self, dimension: &str, field: &str, column: u64, value: i64) -> Result<()>;

    /// Flush buffered facts and release resources.
    async fn close(&self) -> Result<()>;

    /// Hand every fact of one record to the loader. Value facts use the
    /// dimension name as the field name.
    async fn load(&self, facts: &[Fact<'_>]) -> Result<()> {
        for fact in facts {
            match *fact {
                Fact::Bit {
                    dimension,
                    column,
                    row,
                } => self.add_bit(dimension, column, row).await?,
                Fact::Value {
                    dimension,
                    column,
                    value,
                } => self.add_value(dimension, dimension, column, value).await?,
            }
        }
        Ok(())
    }
}
