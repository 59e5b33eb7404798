//! `odp upload` command implementation
//!
//! Streams CSV data to the platform, one table at a time in foreign-key
//! order. A failing table aborts only its own remaining chunks; sibling
//! tables still get their turn, and the first failure decides the exit
//! status.

use crate::commands::PackageContext;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::progress;
use colored::Colorize;
use odp_pipeline::api::ApiClient;
use odp_pipeline::source::RowSource;
use odp_pipeline::upload::{UploadReport, Uploader};
use std::path::Path;

/// Upload data for the declared tables
pub async fn run(
    config: &Config,
    datapackage: &Path,
    table: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let ctx = PackageContext::load(datapackage)?;
    let selected = ctx.select(table.as_deref())?;

    let client = ApiClient::new(&config.api_options())?;
    let mut settings = config.upload.clone();
    settings.dry_run = dry_run;
    let uploader = Uploader::new(&client, &settings);

    if dry_run {
        println!("{} Dry run: no rows will be posted", "→".cyan());
    }

    let mut first_failure: Option<CliError> = None;

    for &i in &selected {
        let (resource, _) = &ctx.mapped[i];

        match upload_one(&uploader, &ctx, i).await {
            Ok(report) => match report.failure {
                None => {
                    println!(
                        "{} {}: {} row(s) in {} chunk(s)",
                        "✓".green(),
                        report.table,
                        progress::format_rows(report.rows_uploaded),
                        report.chunks_succeeded
                    );
                },
                Some(failure) => {
                    // the uploader already stopped at the first bad chunk
                    println!(
                        "{} {}: aborted at chunk {} (row offset {}): {}",
                        "✗".red(),
                        report.table,
                        failure.chunk_index,
                        failure.row_offset,
                        failure.cause
                    );
                    first_failure.get_or_insert(failure.to_error().into());
                },
            },
            Err(e) => {
                println!("{} {}: {}", "✗".red(), resource.name, e);
                first_failure.get_or_insert(e);
            },
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => {
            println!("\n{} All tables uploaded", "✓".green().bold());
            Ok(())
        },
    }
}

/// Upload a single resource, reporting its outcome
async fn upload_one(
    uploader: &Uploader<'_>,
    ctx: &PackageContext,
    index: usize,
) -> Result<UploadReport> {
    let (resource, mapping) = &ctx.mapped[index];

    let data_path = ctx.data_path(resource);
    if !data_path.exists() {
        return Err(CliError::FileNotFound(data_path.display().to_string()));
    }

    let spinner = progress::create_spinner(&format!("Uploading {}...", resource.name));
    let source = RowSource::open(&data_path, resource.delimiter)?;
    let report = uploader.upload(resource, mapping, source).await?;
    spinner.finish_and_clear();

    Ok(report)
}
