//! `odp create` command implementation
//!
//! Creates the declared tables on the platform with normalized names,
//! parents before children. Tables that already exist are left untouched.

use crate::commands::PackageContext;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use odp_pipeline::api::{ApiClient, TableCreator};
use std::path::Path;
use tracing::info;

/// Create all declared tables
pub async fn run(config: &Config, datapackage: &Path) -> Result<()> {
    let ctx = PackageContext::load(datapackage)?;
    let client = ApiClient::new(&config.api_options())?;

    println!(
        "{} Creating {} table(s) for '{}' on {}...",
        "→".cyan(),
        ctx.mapped.len(),
        ctx.package.name,
        config.base_url
    );

    let mut created = 0;
    for &i in &ctx.order {
        let (resource, _) = &ctx.mapped[i];

        if client.table_exists(&resource.name).await? {
            println!("{} {} (exists)", "✓".green(), resource.name);
            continue;
        }

        client.create_table(resource).await?;
        info!(table = %resource.name, "table created");
        println!("{} {} created", "✓".green(), resource.name);
        created += 1;
    }

    println!(
        "\n{} {} table(s) created, {} already present",
        "✓".green().bold(),
        created,
        ctx.mapped.len() - created
    );

    Ok(())
}
