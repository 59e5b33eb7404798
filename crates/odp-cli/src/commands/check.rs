//! `odp check` command implementation
//!
//! Lists the declared tables and whether each exists on the platform.

use crate::commands::PackageContext;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use odp_pipeline::api::ApiClient;
use std::path::Path;

/// Check which declared tables exist on the platform
pub async fn run(config: &Config, datapackage: &Path) -> Result<()> {
    let ctx = PackageContext::load(datapackage)?;
    let client = ApiClient::new(&config.api_options())?;

    println!(
        "{} Checking '{}' against {} ({})...",
        "→".cyan(),
        ctx.package.name,
        config.base_url,
        config.environment
    );

    let mut missing = 0;
    for &i in &ctx.order {
        let (resource, _) = &ctx.mapped[i];

        if client.table_exists(&resource.name).await? {
            println!("{} {} ({})", "✓".green(), resource.name, resource.original_name);
        } else {
            println!("{} {} ({})", "✗".red(), resource.name, resource.original_name);
            missing += 1;
        }
    }

    if missing == 0 {
        println!("\n{} All {} table(s) exist", "✓".green().bold(), ctx.mapped.len());
    } else {
        println!(
            "\n{} {} of {} table(s) missing. Run 'odp create' to create them.",
            "!".yellow().bold(),
            missing,
            ctx.mapped.len()
        );
    }

    Ok(())
}
