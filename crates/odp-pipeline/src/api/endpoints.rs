//! API endpoint URL builders
//!
//! Helper functions to construct platform endpoint URLs.

/// Build table info URL (also used for existence checks and creation)
pub fn table_url(base_url: &str, schema: &str, table: &str) -> String {
    format!(
        "{}/api/v0/schema/{}/tables/{}/",
        base_url.trim_end_matches('/'),
        schema,
        table
    )
}

/// Build row-ingest URL for one table
pub fn rows_url(base_url: &str, schema: &str, table: &str) -> String {
    format!(
        "{}/api/v0/schema/{}/tables/{}/rows/new",
        base_url.trim_end_matches('/'),
        schema,
        table
    )
}

/// Build metadata URL for one table
pub fn metadata_url(base_url: &str, schema: &str, table: &str) -> String {
    format!(
        "{}/api/v0/schema/{}/tables/{}/meta/",
        base_url.trim_end_matches('/'),
        schema,
        table
    )
}
