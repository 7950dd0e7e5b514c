//! Ingestion orchestrator
//!
//! One run moves through these phases:
//!
//! 1. **provision**: create the index schema through the loader
//! 2. **enumerate**: list every object under the prefix
//! 3. **fan-out**: a bounded pool of extractors streams objects into the
//!    record channel
//! 4. **fan-in**: a fixed pool of load workers stamps column ids, maps each
//!    record to facts and hands them to the loader
//! 5. **drain**: once extraction ends the record channel closes, the load
//!    workers empty it and the loader is flushed
//!
//! The record channel is bounded and is the only backpressure between the
//! stages. The first fatal error cancels every worker. Cancelling the token
//! passed to [`Orchestrator::run`] stops the stages early but still flushes
//! the loader.

use crate::config::IngestConfig;
use crate::counter::IdentitySequencer;
use crate::error::{IngestError, Result};
use crate::extract::{Extraction, ObjectStreamExtractor};
use crate::loader::BulkLoader;
use crate::mapper::FieldMapper;
use crate::model::User;
use crate::stats::{spawn_ticker, Stats};
use crate::store::{ObjectDescriptor, ObjectStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Objects discovered under the prefix.
    pub objects: u64,
    /// Objects read to the end.
    pub objects_completed: u64,
    pub bytes: u64,
    pub records: u64,
    pub malformed: u64,
    /// Highest column id issued, if any.
    pub last_column: Option<u64>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Stopped early by an interrupt.
    pub interrupted: bool,
}

pub struct Orchestrator {
    config: IngestConfig,
    store: Arc<dyn ObjectStore>,
    loader: Arc<dyn BulkLoader>,
    mapper: FieldMapper,
    sequencer: Arc<IdentitySequencer>,
    stats: Arc<Stats>,
}

impl Orchestrator {
    pub fn new(
        config: IngestConfig,
        store: Arc<dyn ObjectStore>,
        loader: Arc<dyn BulkLoader>,
        mapper: FieldMapper,
    ) -> Self {
        Self {
            config,
            store,
            loader,
            mapper,
            sequencer: Arc::new(IdentitySequencer::new()),
            stats: Arc::new(Stats::new()),
        }
    }

    /// Live counters, e.g. for the interrupt report.
    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    #[instrument(skip_all, fields(bucket = %self.config.bucket, prefix = %self.config.prefix))]
    pub async fn run(&self, interrupt: CancellationToken) -> Result<RunSummary> {
        self.config.validate()?;

        self.loader.provision(&self.mapper.tables().schema()).await?;

        let objects = tokio::select! {
            biased;
            _ = interrupt.cancelled() => return Ok(self.summary(0, true)),
            listed = self.store.list(&self.config.bucket, &self.config.prefix) => listed?,
        };
        let object_count = objects.len() as u64;
        let total_size: u64 = objects.iter().map(|o| o.size).sum();
        info!(objects = object_count, total_size, "Enumerated objects");
        if objects.is_empty() {
            warn!("No objects found under prefix");
        }

        let cancel = interrupt.child_token();
        let ticker_stop = cancel.child_token();
        let ticker = spawn_ticker(self.stats.clone(), self.config.stats_interval, ticker_stop.clone());

        let (record_tx, record_rx) = mpsc::channel::<User>(self.config.record_channel_capacity);
        let mut extractors = self.spawn_extractors(objects, record_tx, &cancel);
        let mut loaders = self.spawn_loaders(Arc::new(Mutex::new(record_rx)), &cancel);

        let mut failure: Option<IngestError> = None;
        let mut extraction_done = false;
        loop {
            let joined = tokio::select! {
                Some(joined) = extractors.join_next() => joined,
                Some(joined) = loaders.join_next() => joined,
                else => break,
            };

            if let Err(e) = joined.map_err(IngestError::from).and_then(|r| r) {
                if failure.is_none() {
                    error!(error = %e, "Worker failed, cancelling run");
                    cancel.cancel();
                    failure = Some(e);
                } else {
                    debug!(error = %e, "Further worker failure");
                }
            }

            if !extraction_done && extractors.is_empty() {
                extraction_done = true;
                debug!("Extraction finished, draining records");
            }
        }

        ticker_stop.cancel();
        if let Err(e) = ticker.await {
            warn!(error = %e, "Stats ticker ended abnormally");
        }

        if let Some(e) = failure {
            return Err(e);
        }

        self.loader.close().await?;
        Ok(self.summary(object_count, interrupt.is_cancelled()))
    }

    fn spawn_extractors(
        &self,
        objects: Vec<ObjectDescriptor>,
        record_tx: mpsc::Sender<User>,
        cancel: &CancellationToken,
    ) -> JoinSet<Result<()>> {
        let mut set = JoinSet::new();
        let workers = self.config.extract_workers.min(objects.len());

        let (object_tx, object_rx) = mpsc::channel(self.config.object_channel_capacity);
        let object_rx: SharedReceiver<ObjectDescriptor> = Arc::new(Mutex::new(object_rx));

        let token = cancel.clone();
        set.spawn(async move {
            for object in objects {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    sent = object_tx.send(object) => if sent.is_err() { break },
                }
            }
            Ok(())
        });

        let extractor = ObjectStreamExtractor::new(
            self.store.clone(),
            self.config.bucket.clone(),
            self.config.max_line_bytes,
            self.stats.clone(),
        );

        for worker in 0..workers {
            let extractor = extractor.clone();
            let objects = object_rx.clone();
            let records = record_tx.clone();
            let token = cancel.clone();

            set.spawn(async move {
                loop {
                    let next = {
                        let mut rx = objects.lock().await;
                        tokio::select! {
                            _ = token.cancelled() => None,
                            object = rx.recv() => object,
                        }
                    };
                    let Some(object) = next else { break };

                    if let Extraction::Cancelled { lines } = extractor.extract(&object, &records, &token).await? {
                        debug!(worker, key = %object.key, lines, "Extraction cancelled");
                        break;
                    }
                }
                Ok(())
            });
        }

        debug!(workers, "Extraction workers started");
        set
    }

    fn spawn_loaders(&self, records: SharedReceiver<User>, cancel: &CancellationToken) -> JoinSet<Result<()>> {
        let mut set = JoinSet::new();

        for worker in 0..self.config.load_workers {
            let records = records.clone();
            let token = cancel.clone();
            let mapper = self.mapper.clone();
            let loader = self.loader.clone();
            let sequencer = self.sequencer.clone();
            let stats = self.stats.clone();

            set.spawn(async move {
                loop {
                    let next = tokio::select! {
                        _ = token.cancelled() => None,
                        user = async { records.lock().await.recv().await } => user,
                    };
                    let Some(mut user) = next else { break };

                    let column = sequencer.next();
                    user.column_id = Some(column);
                    loader.load(&mapper.map(&user, column)).await?;
                    stats.records.add(1);
                }
                debug!(worker, "Load worker finished");
                Ok(())
            });
        }

        set
    }

    fn summary(&self, objects: u64, interrupted: bool) -> RunSummary {
        let snapshot = self.stats.snapshot();
        RunSummary {
            objects,
            objects_completed: snapshot.objects,
            bytes: snapshot.bytes,
            records: snapshot.records,
            malformed: snapshot.malformed,
            last_column: self.sequencer.issued().checked_sub(1),
            started_at: self.stats.started_at(),
            elapsed: snapshot.elapsed,
            interrupted,
        }
    }
}
