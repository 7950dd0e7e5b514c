//! Run-wide progress counters and the periodic throughput log

use crate::counter::Counter;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use u360_common::format::{format_byte_rate, format_bytes, per_second};

/// Counters shared by every worker of one run.
#[derive(Debug)]
pub struct Stats {
    /// Line bytes read, excluding line terminators.
    pub bytes: Counter,
    /// Records mapped and handed to the loader.
    pub records: Counter,
    /// Lines that failed to decode and were loaded as zero-valued records.
    pub malformed: Counter,
    /// Objects fully extracted.
    pub objects: Counter,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    pub fn new() -> Self {
        Self {
            bytes: Counter::new(),
            records: Counter::new(),
            malformed: Counter::new(),
            objects: Counter::new(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Wall-clock start of the run.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes: self.bytes.get(),
            records: self.records.get(),
            malformed: self.malformed.get(),
            objects: self.objects.get(),
            elapsed: self.elapsed(),
        }
    }
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub bytes: u64,
    pub records: u64,
    pub malformed: u64,
    pub objects: u64,
    pub elapsed: Duration,
}

impl StatsSnapshot {
    pub fn records_per_second(&self) -> f64 {
        per_second(self.records, self.elapsed)
    }

    pub fn log(&self, message: &'static str) {
        info!(
            bytes = self.bytes,
            size = %format_bytes(self.bytes),
            records = self.records,
            malformed = self.malformed,
            objects = self.objects,
            elapsed_secs = self.elapsed.as_secs(),
            rate = %format_byte_rate(self.bytes, self.elapsed),
            records_per_sec = self.records_per_second() as u64,
            "{message}"
        );
    }
}

/// Log a snapshot every `every` until `cancel` fires.
pub fn spawn_ticker(stats: Arc<Stats>, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => stats.snapshot().log("Progress"),
            }
        }
    })
}
