//! ODP Upload Pipeline Library
//!
//! Core pipeline for publishing tabular datasets to an open-data platform:
//!
//! - **Datapackage**: parse the JSON metadata file describing tables,
//!   columns, and data file paths
//! - **Normalization**: rewrite table and column names to satisfy the
//!   platform's identifier constraints
//! - **Schema Mapping**: turn declared resources into platform-ready table
//!   definitions plus a per-table column name mapping
//! - **Upload**: stream CSV files in row-bounded chunks to the platform's
//!   rows endpoint, sequentially and with retry on transient failures
//!
//! # Example
//!
//! ```no_run
//! use odp_pipeline::api::{ApiClient, ApiOptions};
//! use odp_pipeline::datapackage::Datapackage;
//! use odp_pipeline::schema;
//! use odp_pipeline::source::RowSource;
//! use odp_pipeline::upload::{UploadSettings, Uploader};
//!
//! #[tokio::main]
//! async fn main() -> odp_pipeline::Result<()> {
//!     let package = Datapackage::load("datapackage.json")?;
//!     let mapped = schema::map_datapackage(&package)?;
//!
//!     let client = ApiClient::new(&ApiOptions::new("http://127.0.0.1:8000"))?;
//!     let settings = UploadSettings::default();
//!     let uploader = Uploader::new(&client, &settings);
//!
//!     for (resource, mapping) in &mapped {
//!         let source = RowSource::open(&resource.path, resource.delimiter)?;
//!         let report = uploader.upload(resource, mapping, source).await?;
//!         println!("{}: {} rows", resource.name, report.rows_uploaded);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod datapackage;
pub mod error;
pub mod normalize;
pub mod order;
pub mod schema;
pub mod source;
pub mod upload;

// Re-export commonly used types
pub use error::{PipelineError, Result};
pub use schema::{Column, NameMapping, Resource};
pub use upload::{UploadReport, UploadSettings, Uploader};
