//! Object -> record extraction
//!
//! Reads one object line by line and publishes a [`User`] per line. A line
//! that does not decode is still published, as a zero-valued record, and
//! counted in [`Stats::malformed`]. Only transport failures and lines longer
//! than the configured ceiling end the run.

use crate::error::{IngestError, Result};
use crate::model::User;
use crate::stats::Stats;
use crate::store::{ObjectDescriptor, ObjectStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Initial capacity of the per-object line buffer.
pub const INITIAL_LINE_BUFFER: usize = 64 * 1024;

/// How an extraction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Every line of the object was published.
    Complete { lines: u64 },
    /// Cancelled after publishing `lines` lines.
    Cancelled { lines: u64 },
}

#[derive(Clone)]
pub struct ObjectStreamExtractor {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    max_line_bytes: usize,
    stats: Arc<Stats>,
}

impl ObjectStreamExtractor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        max_line_bytes: usize,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            max_line_bytes,
            stats,
        }
    }

    /// Stream `object` into `records`.
    #[instrument(skip_all, fields(key = %object.key))]
    pub async fn extract(
        &self,
        object: &ObjectDescriptor,
        records: &mpsc::Sender<User>,
        cancel: &CancellationToken,
    ) -> Result<Extraction> {
        debug!(size = object.size, "Extracting object");

        let mut reader = self.store.get(&self.bucket, &object.key).await?;
        let mut buf = Vec::with_capacity(INITIAL_LINE_BUFFER.min(self.max_line_bytes));
        // Room for the longest accepted line plus a `\r\n` terminator.
        let ceiling = self.max_line_bytes as u64 + 2;
        let mut lines = 0u64;

        loop {
            buf.clear();
            let mut line_reader = (&mut reader).take(ceiling);
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Extraction::Cancelled { lines }),
                read = line_reader.read_until(b'\n', &mut buf) => read,
            };
            let read = read.map_err(|e| IngestError::Fetch {
                key: object.key.clone(),
                message: e.to_string(),
            })?;
            if read == 0 {
                break;
            }

            lines += 1;
            let line = trim_line_ending(&buf);
            if line.len() > self.max_line_bytes {
                return Err(IngestError::LineTooLong {
                    key: object.key.clone(),
                    line: lines,
                    limit: self.max_line_bytes,
                });
            }

            self.stats.bytes.add(line.len() as u64);

            let mut user = match serde_json::from_slice::<User>(line) {
                Ok(user) => user,
                Err(e) => {
                    self.stats.malformed.add(1);
                    debug!(line = lines, error = %e, "Malformed record, loading as empty");
                    User::default()
                }
            };
            user.row_num = lines;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Extraction::Cancelled { lines: lines - 1 }),
                sent = records.send(user) => {
                    if sent.is_err() {
                        return Err(IngestError::Worker("record channel closed".to_string()));
                    }
                }
            }
        }

        self.stats.objects.add(1);
        debug!(lines, "Finished object");
        Ok(Extraction::Complete { lines })
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}
