//! Pilosa HTTP bulk loader
//!
//! Facts are rendered as PQL (`SetBit` / `SetFieldValue`) into a shared
//! buffer. Once the buffer holds `batch_size` statements it is swapped out
//! and posted as one query, so workers only contend on the buffer swap and
//! never on the network call. Hosts take turns per batch.

use super::BulkLoader;
use crate::dimensions::{FramePolicy, FrameSpec};
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

// ============================================================================
// Loader Constants
// ============================================================================

/// Default Pilosa host when none is configured.
pub const DEFAULT_HOST: &str = "localhost:10101";

/// Default number of statements per import request.
pub const DEFAULT_BATCH_SIZE: usize = 1_000_000;

pub struct PilosaLoader {
    client: Client,
    hosts: Vec<String>,
    index: String,
    batch_size: usize,
    next_host: AtomicUsize,
    buffer: Mutex<Vec<String>>,
}

impl PilosaLoader {
    /// `hosts` are `host:port` pairs or full base URLs.
    pub fn new(
        client: Client,
        hosts: impl IntoIterator<Item = impl AsRef<str>>,
        index: impl Into<String>,
        batch_size: usize,
    ) -> Result<Self> {
        let hosts: Vec<String> = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty())
            .map(|h| if h.contains("://") { h } else { format!("http://{h}") })
            .collect();

        if hosts.is_empty() {
            return Err(IngestError::config("at least one Pilosa host is required"));
        }
        if batch_size == 0 {
            return Err(IngestError::config("batch size must be greater than zero"));
        }

        Ok(Self {
            client,
            hosts,
            index: index.into(),
            batch_size,
            next_host: AtomicUsize::new(0),
            buffer: Mutex::new(Vec::with_capacity(batch_size.min(DEFAULT_BATCH_SIZE))),
        })
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    fn host(&self) -> &str {
        let i = self.next_host.fetch_add(1, Ordering::Relaxed) % self.hosts.len();
        &self.hosts[i]
    }

    async fn push(&self, statement: String) -> Result<()> {
        let batch = {
            let mut buffer = self.buffer.lock().await;
            buffer.push(statement);
            if buffer.len() < self.batch_size {
                return Ok(());
            }
            std::mem::replace(&mut *buffer, Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE)))
        };
        self.import(batch).await
    }

    async fn import(&self, batch: Vec<String>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let host = self.host();
        let url = format!("{host}/index/{}/query", self.index);
        let response = self.client.post(&url).body(batch.join("\n")).send().await?;
        check_status(response).await?;

        debug!(host, statements = batch.len(), "Imported batch");
        Ok(())
    }

    /// POST `body` to `path`; a 409 means the resource already exists.
    async fn create(&self, path: &str, body: Value) -> Result<bool> {
        let url = format!("{}{path}", self.host());
        let response = self.client.post(&url).json(&body).send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(IngestError::Loader {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

/// Frame creation options in Pilosa's JSON shape.
pub fn frame_options(frame: &FrameSpec) -> Value {
    match frame.policy {
        FramePolicy::Ranked { cache_size } => json!({
            "options": {
                "cacheType": "ranked",
                "cacheSize": cache_size,
                "inverseEnabled": frame.inverse_enabled,
            }
        }),
        FramePolicy::Range { min, max } => json!({
            "options": {
                "rangeEnabled": true,
                "inverseEnabled": frame.inverse_enabled,
                "fields": [{ "name": frame.name, "type": "int", "min": min, "max": max }],
            }
        }),
    }
}

pub fn set_bit(frame: &str, column: u64, row: u64) -> String {
    format!("SetBit(frame=\"{frame}\", rowID={row}, columnID={column})")
}

pub fn set_field_value(frame: &str, field: &str, column: u64, value: i64) -> String {
    format!("SetFieldValue(frame=\"{frame}\", columnID={column}, {field}={value})")
}

#[async_trait]
impl BulkLoader for PilosaLoader {
    #[instrument(skip_all, fields(index = %self.index, frames = schema.len()))]
    async fn provision(&self, schema: &[FrameSpec]) -> Result<()> {
        let created = self.create(&format!("/index/{}", self.index), json!({ "options": {} })).await?;
        if created {
            info!("Created index");
        }

        let mut new_frames = 0;
        for frame in schema {
            let path = format!("/index/{}/frame/{}", self.index, frame.name);
            if self.create(&path, frame_options(frame)).await? {
                new_frames += 1;
            }
        }

        info!(new_frames, "Schema provisioned");
        Ok(())
    }

    async fn add_bit(&self, dimension: &str, column: u64, row: u64) -> Result<()> {
        self.push(set_bit(dimension, column, row)).await
    }

    async fn add_value(&self, dimension: &str, field: &str, column: u64, value: i64) -> Result<()> {
        self.push(set_field_value(dimension, field, column, value)).await
    }

    async fn close(&self) -> Result<()> {
        let batch = std::mem::take(&mut *self.buffer.lock().await);
        debug!(statements = batch.len(), "Flushing loader");
        self.import(batch).await
    }
}
