//! U360 Ingest - S3 to Pilosa user-profile loader

use anyhow::Result;
use clap::Parser;
use std::io::BufWriter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use u360_common::format::{format_byte_rate, format_bytes};
use u360_common::logging::{init_logging, LogConfig, LogLevel};
use u360_ingest::cli::Cli;
use u360_ingest::dimensions::DimensionTables;
use u360_ingest::generate;
use u360_ingest::hash::{Murmur2, StringHasher};
use u360_ingest::loader::PilosaLoader;
use u360_ingest::mapper::FieldMapper;
use u360_ingest::stats::Stats;
use u360_ingest::store::{S3ObjectStore, S3Settings};
use u360_ingest::Orchestrator;

/// Exit status after a second interrupt.
const ABORT_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(value) = &cli.hash {
        println!("Hash value is {}.", Murmur2::new().hash(value));
        return Ok(());
    }

    if let Some(count) = cli.generate_count() {
        let stdout = BufWriter::new(std::io::stdout().lock());
        generate::write_users(count, &mut rand::rng(), stdout)?;
        return Ok(());
    }

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("u360-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let config = cli.ingest_config()?;
    info!(
        hosts = ?config.hosts,
        index = %config.index,
        buffer_size = config.buffer_size,
        region = %config.region,
        "Starting ingestion"
    );

    let store = S3ObjectStore::connect(&S3Settings {
        region: Some(config.region.clone()),
        endpoint: config.endpoint.clone(),
    })
    .await;
    let loader = PilosaLoader::new(
        reqwest::Client::builder().build()?,
        &config.hosts,
        config.index.clone(),
        config.buffer_size,
    )?;
    let mapper = FieldMapper::new(Arc::new(DimensionTables::standard()), Arc::new(Murmur2::new()));

    let orchestrator = Orchestrator::new(config, Arc::new(store), Arc::new(loader), mapper);

    let interrupt = CancellationToken::new();
    tokio::spawn(watch_interrupts(interrupt.clone(), orchestrator.stats()));

    let summary = match orchestrator.run(interrupt).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Ingestion failed");
            return Err(e.into());
        }
    };

    info!(
        objects = summary.objects,
        objects_completed = summary.objects_completed,
        records = summary.records,
        malformed = summary.malformed,
        last_record = ?summary.last_column,
        bytes = summary.bytes,
        size = %format_bytes(summary.bytes),
        rate = %format_byte_rate(summary.bytes, summary.elapsed),
        started_at = %summary.started_at.to_rfc3339(),
        elapsed_secs = summary.elapsed.as_secs(),
        interrupted = summary.interrupted,
        "Completed"
    );

    Ok(())
}

/// First Ctrl-C: report progress and stop the run cooperatively so the loader
/// is still flushed. Second Ctrl-C: exit at once, dropping buffered facts.
async fn watch_interrupts(interrupt: CancellationToken, stats: Arc<Stats>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    warn!(
        bytes = stats.bytes.get(),
        size = %format_bytes(stats.bytes.get()),
        "Interrupted, draining and flushing (interrupt again to abort)"
    );
    interrupt.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!(bytes = stats.bytes.get(), "Aborted without flushing");
        std::process::exit(ABORT_EXIT_CODE);
    }
}
