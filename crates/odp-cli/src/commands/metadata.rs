//! `odp metadata` command implementation
//!
//! Pushes each resource's metadata document to its table's meta endpoint.
//! The tables must already exist (`odp create`).

use crate::commands::PackageContext;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use odp_pipeline::api::ApiClient;
use std::path::Path;
use tracing::info;

/// Push resource metadata documents
pub async fn run(config: &Config, datapackage: &Path, table: Option<String>) -> Result<()> {
    let ctx = PackageContext::load(datapackage)?;
    let selected = ctx.select(table.as_deref())?;
    let client = ApiClient::new(&config.api_options())?;

    for &i in &selected {
        let (resource, _) = &ctx.mapped[i];
        let metadata = serde_json::to_value(&ctx.package.resources[i])?;

        client.post_metadata(&resource.name, &metadata).await?;
        info!(table = %resource.name, "metadata uploaded");
        println!("{} {} metadata uploaded", "✓".green(), resource.name);
    }

    Ok(())
}
