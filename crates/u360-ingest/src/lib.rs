//! U360 Ingest Library
//!
//! Concurrent loader for user-profile exports. NDJSON objects are read from
//! S3, every record is mapped to bitmap-index facts, and the facts are
//! bulk-loaded into Pilosa.
//!
//! # Pipeline
//!
//! - **Enumerate**: [`store::ObjectStore::list`] finds the objects
//! - **Extract**: [`extract::ObjectStreamExtractor`] turns each line into a
//!   [`model::User`]
//! - **Map**: [`mapper::FieldMapper`] produces [`facts::Fact`]s
//! - **Load**: [`loader::BulkLoader`] buffers and imports them
//!
//! [`pipeline::Orchestrator`] wires the stages together.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use u360_ingest::{
//!     config::IngestConfig, dimensions::DimensionTables, hash::Murmur2,
//!     loader::MemoryLoader, mapper::FieldMapper, pipeline::Orchestrator,
//!     store::MemoryObjectStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryObjectStore::new().with_object("users", "day=1/part-0", "{\"age\":30}\n");
//!     let mapper = FieldMapper::new(Arc::new(DimensionTables::standard()), Arc::new(Murmur2::new()));
//!     let orchestrator = Orchestrator::new(
//!         IngestConfig::new("users", "day=1/"),
//!         Arc::new(store),
//!         Arc::new(MemoryLoader::new()),
//!         mapper,
//!     );
//!
//!     let summary = orchestrator.run(CancellationToken::new()).await?;
//!     println!("{} records", summary.records);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod counter;
pub mod dimensions;
pub mod error;
pub mod extract;
pub mod facts;
pub mod generate;
pub mod hash;
pub mod loader;
pub mod mapper;
pub mod model;
pub mod pipeline;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use error::{IngestError, Result};
pub use pipeline::{Orchestrator, RunSummary};
