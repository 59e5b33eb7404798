//! Build automation tasks for the ODP upload tools
//!
//! Currently the only task generates the CLI reference documentation from
//! the clap definitions.

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for odp-upload", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate CLI documentation in markdown format
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

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<odp_cli::Cli>();

    let content = format!(
        r#"# ODP CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

`odp` uploads tabular datasets described by a datapackage file to an
open-data platform: it creates normalized tables, streams CSV data in
chunks, and pushes resource metadata.

## Quick Start

```bash
# See which declared tables exist on the platform
odp check

# Create the missing tables
odp create

# Upload the CSV data
odp upload

# Push the metadata documents
odp metadata
```

## Commands

{}

## Environment Variables

- `ODP_ENV` - Target environment, `local` or `production` (default: `local`)
- `ODP_BASE_URL` - Platform base URL (default: `http://127.0.0.1:8000` for local)
- `ODP_API_TOKEN` - API token (required for production)
- `ODP_SCHEMA` - Target schema on the platform (default: `model_draft`)
- `ODP_DATAPACKAGE` - Path to the datapackage file (default: `datapackage.json`)
- `ODP_CHUNK_ROWS` - Rows per upload chunk (default: `500`)
- `ODP_TIMEOUT_SECS` - Per-request timeout (default: `120`)
- `ODP_LOG_LEVEL` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

A `.env` file next to the working directory is loaded on startup.

---

*This documentation is automatically generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    // Write the markdown file
    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());

    Ok(())
}
