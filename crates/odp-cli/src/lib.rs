//! ODP CLI Library
//!
//! Command-line interface for publishing tabular datasets to an open-data
//! platform.
//!
//! # Overview
//!
//! The `odp` binary walks a datapackage description through the pipeline:
//!
//! - **Table Creation**: create normalized tables on the platform (`odp create`)
//! - **Data Upload**: stream CSV data in chunks (`odp upload`)
//! - **Metadata**: push resource metadata documents (`odp metadata`)
//! - **Status Checking**: see which tables exist remotely (`odp check`)

pub mod commands;
pub mod config;
pub mod error;
pub mod progress;

// Re-export commonly used types
pub use config::{Config, Environment};
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ODP - Open Data Platform upload tool
#[derive(Parser, Debug)]
#[command(name = "odp")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Target environment
    #[arg(long, env = "ODP_ENV", default_value = "local", global = true)]
    pub env: Environment,

    /// Path to the datapackage description file
    #[arg(
        long,
        env = "ODP_DATAPACKAGE",
        default_value = "datapackage.json",
        global = true
    )]
    pub datapackage: PathBuf,

    /// Platform base URL (overrides the environment default)
    #[arg(long, env = "ODP_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Print CLI documentation as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the declared tables on the platform
    Create,

    /// Upload CSV data for the declared tables
    Upload {
        /// Only upload this table (declared or normalized name)
        #[arg(short, long)]
        table: Option<String>,

        /// Build and count chunks without posting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Push the resource metadata documents to the platform
    Metadata {
        /// Only push metadata for this table (declared or normalized name)
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Check which declared tables exist on the platform
    Check,
}
