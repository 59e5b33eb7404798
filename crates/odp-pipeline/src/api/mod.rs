//! Platform API client
//!
//! Thin HTTP wrapper over the open-data platform's table API: existence
//! checks, table creation, chunked row ingest, and metadata upload.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{ApiClient, ApiOptions, TableCreator};
