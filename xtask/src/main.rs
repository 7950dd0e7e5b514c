//! Build automation tasks for U360
//!
//! Currently one task: regenerating the CLI reference from the clap
//! definitions of `u360-ingest`.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for U360", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<u360_ingest::cli::Cli>();

    let content = format!(
        r#"# u360-ingest CLI Reference

Generated from the CLI source code on {}.

`u360-ingest` streams newline-delimited JSON user profiles from S3 into a
Pilosa index.

## Quick Start

```bash
# Load one day of exports
u360-ingest --hosts pilosa-1:10101,pilosa-2:10101 user-exports 2024-01-01/

# Against LocalStack / MinIO
u360-ingest --endpoint http://localhost:4566 user-exports 2024-01-01/

# Hash a value the way the loader does
u360-ingest --hash 02134

# Print five synthetic users
u360-ingest --gen 5
```

## Commands

{}

## Environment Variables

- `U360_INDEX`, `U360_HOSTS`, `U360_BUFFER_SIZE`, `AWS_REGION`, `U360_S3_ENDPOINT`
- `U360_EXTRACT_WORKERS`, `U360_LOAD_WORKERS`, `U360_STATS_INTERVAL_SECS`, `U360_MAX_LINE_BYTES`
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`, `LOG_FILTER`
- AWS credentials are read from the default provider chain.

A `.env` file in the working directory is loaded on startup.

## Interrupts

The first Ctrl-C stops extraction, lets the load workers finish the record
in hand, and flushes the loader. A second Ctrl-C exits immediately with
status 130 and discards buffered facts.

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
