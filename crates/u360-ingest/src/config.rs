//! Runtime configuration for one ingestion run

use crate::error::{IngestError, Result};
use crate::extract::INITIAL_LINE_BUFFER;
use std::time::Duration;

// ============================================================================
// Configuration Defaults
// ============================================================================

pub const DEFAULT_INDEX: &str = "user360";
pub const DEFAULT_HOSTS: &str = "localhost:10101";
pub const DEFAULT_BUFFER_SIZE: usize = 1_000_000;
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_EXTRACT_WORKERS: usize = 8;
pub const DEFAULT_LOAD_WORKERS: usize = 5;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 10;

/// Hard ceiling on a single NDJSON line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

pub const DEFAULT_OBJECT_CHANNEL_CAPACITY: usize = 100;
pub const DEFAULT_RECORD_CHANNEL_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub bucket: String,
    pub prefix: String,

    /// Target bitmap index.
    pub index: String,
    pub hosts: Vec<String>,
    /// Statements buffered by the loader before an import request.
    pub buffer_size: usize,

    pub region: String,
    pub endpoint: Option<String>,

    pub extract_workers: usize,
    pub load_workers: usize,
    pub stats_interval: Duration,
    pub max_line_bytes: usize,
    pub object_channel_capacity: usize,
    pub record_channel_capacity: usize,
}

impl IngestConfig {
    /// Defaults for everything but the source location.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            index: DEFAULT_INDEX.to_string(),
            hosts: parse_hosts(DEFAULT_HOSTS),
            buffer_size: DEFAULT_BUFFER_SIZE,
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            extract_workers: DEFAULT_EXTRACT_WORKERS,
            load_workers: DEFAULT_LOAD_WORKERS,
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            object_channel_capacity: DEFAULT_OBJECT_CHANNEL_CAPACITY,
            record_channel_capacity: DEFAULT_RECORD_CHANNEL_CAPACITY,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("extract workers", self.extract_workers),
            ("load workers", self.load_workers),
            ("buffer size", self.buffer_size),
            ("object channel capacity", self.object_channel_capacity),
            ("record channel capacity", self.record_channel_capacity),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(IngestError::config(format!("{name} must be greater than zero")));
        }

        if self.bucket.is_empty() {
            return Err(IngestError::config("bucket must not be empty"));
        }
        if self.index.is_empty() {
            return Err(IngestError::config("index name must not be empty"));
        }
        if self.hosts.is_empty() {
            return Err(IngestError::config("at least one Pilosa host is required"));
        }
        if self.stats_interval.is_zero() {
            return Err(IngestError::config("stats interval must be greater than zero"));
        }
        if self.max_line_bytes < INITIAL_LINE_BUFFER {
            return Err(IngestError::config(format!(
                "max line bytes ({}) must be at least {INITIAL_LINE_BUFFER}",
                self.max_line_bytes
            )));
        }
        Ok(())
    }
}

/// Split a comma-separated host list, dropping blanks.
pub fn parse_hosts(hosts: &str) -> Vec<String> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}
