//! Command-line surface of `u360-ingest`

use crate::config::{
    parse_hosts, IngestConfig, DEFAULT_BUFFER_SIZE, DEFAULT_EXTRACT_WORKERS, DEFAULT_HOSTS,
    DEFAULT_INDEX, DEFAULT_LOAD_WORKERS, DEFAULT_MAX_LINE_BYTES, DEFAULT_REGION,
    DEFAULT_STATS_INTERVAL_SECS,
};
use crate::error::{IngestError, Result};
use clap::Parser;
use std::time::Duration;

/// Number of records `--gen` prints when no count is given.
pub const DEFAULT_GENERATE_COUNT: usize = 10;

/// Load NDJSON user profiles from S3 into a Pilosa index
#[derive(Parser, Debug)]
#[command(name = "u360-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// S3 bucket holding the user export
    #[arg(required_unless_present_any = ["hash", "generate"])]
    pub bucket: Option<String>,

    /// Key prefix of the objects to load
    #[arg(required_unless_present_any = ["hash", "generate"])]
    pub prefix: Option<String>,

    /// Index name
    #[arg(long, env = "U360_INDEX", default_value = DEFAULT_INDEX)]
    pub index: String,

    /// Pilosa server hosts as a comma separated list
    #[arg(long, env = "U360_HOSTS", default_value = DEFAULT_HOSTS)]
    pub hosts: String,

    /// Statements buffered before each import request
    #[arg(long = "buf-size", env = "U360_BUFFER_SIZE", default_value_t = DEFAULT_BUFFER_SIZE)]
    pub buf_size: usize,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Custom S3 endpoint (MinIO, LocalStack)
    #[arg(long, env = "U360_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Print the hash value for a string and exit
    #[arg(long, value_name = "STRING")]
    pub hash: Option<String>,

    /// Print N random users as NDJSON and exit
    #[arg(long = "gen", value_name = "N", num_args = 0..=1)]
    pub generate: Option<Option<usize>>,

    /// Concurrent object extractions
    #[arg(long, env = "U360_EXTRACT_WORKERS", default_value_t = DEFAULT_EXTRACT_WORKERS)]
    pub extract_workers: usize,

    /// Concurrent load workers
    #[arg(long, env = "U360_LOAD_WORKERS", default_value_t = DEFAULT_LOAD_WORKERS)]
    pub load_workers: usize,

    /// Seconds between progress log lines
    #[arg(long, env = "U360_STATS_INTERVAL_SECS", default_value_t = DEFAULT_STATS_INTERVAL_SECS)]
    pub stats_interval: u64,

    /// Longest accepted input line in bytes
    #[arg(long, env = "U360_MAX_LINE_BYTES", default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Record count for `--gen`, or `None` when the flag is absent.
    pub fn generate_count(&self) -> Option<usize> {
        self.generate.map(|count| count.unwrap_or(DEFAULT_GENERATE_COUNT))
    }

    /// Validated run configuration. Fails when the positionals are missing.
    pub fn ingest_config(&self) -> Result<IngestConfig> {
        let (Some(bucket), Some(prefix)) = (&self.bucket, &self.prefix) else {
            return Err(IngestError::config("S3 bucket and prefix must be specified"));
        };

        let config = IngestConfig {
            index: self.index.clone(),
            hosts: parse_hosts(&self.hosts),
            buffer_size: self.buf_size,
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            extract_workers: self.extract_workers,
            load_workers: self.load_workers,
            stats_interval: Duration::from_secs(self.stats_interval),
            max_line_bytes: self.max_line_bytes,
            ..IngestConfig::new(bucket.clone(), prefix.clone())
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["u360-ingest", "users", "2024/"]).unwrap();
        let config = cli.ingest_config().unwrap();
        assert_eq!(config.bucket, "users");
        assert_eq!(config.prefix, "2024/");
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.extract_workers, DEFAULT_EXTRACT_WORKERS);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "u360-ingest",
            "--index",
            "u360_test",
            "--hosts",
            "p1:10101,p2:10101",
            "--buf-size",
            "500",
            "--load-workers",
            "2",
            "--endpoint",
            "http://localhost:4566",
            "users",
            "",
        ])
        .unwrap();
        let config = cli.ingest_config().unwrap();
        assert_eq!(config.index, "u360_test");
        assert_eq!(config.hosts, vec!["p1:10101", "p2:10101"]);
        assert_eq!(config.buffer_size, 500);
        assert_eq!(config.load_workers, 2);
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_positionals_required_without_side_exit() {
        assert!(Cli::try_parse_from(["u360-ingest"]).is_err());
        assert!(Cli::try_parse_from(["u360-ingest", "users"]).is_err());
        assert!(Cli::try_parse_from(["u360-ingest", "--hash", "abc"]).is_ok());
    }

    #[test]
    fn test_gen_count() {
        let cli = Cli::try_parse_from(["u360-ingest", "--gen"]).unwrap();
        assert_eq!(cli.generate_count(), Some(DEFAULT_GENERATE_COUNT));

        let cli = Cli::try_parse_from(["u360-ingest", "--gen", "3"]).unwrap();
        assert_eq!(cli.generate_count(), Some(3));

        let cli = Cli::try_parse_from(["u360-ingest", "--gen", "0"]).unwrap();
        assert_eq!(cli.generate_count(), Some(0));

        let cli = Cli::try_parse_from(["u360-ingest", "users", "2024/"]).unwrap();
        assert_eq!(cli.generate_count(), None);
    }

    #[test]
    fn test_invalid_worker_count() {
        let cli = Cli::try_parse_from(["u360-ingest", "--extract-workers", "0", "b", "p"]).unwrap();
        assert!(cli.ingest_config().is_err());
    }
}
