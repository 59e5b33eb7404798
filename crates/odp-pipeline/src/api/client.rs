//! HTTP client for the platform's table API
//!
//! All operations are synchronous request/response from the pipeline's
//! point of view; retry policy lives in the uploader, not here. Non-2xx
//! responses surface as typed errors: 5xx as transient, 4xx as rejections.

use crate::api::endpoints;
use crate::api::types::{ErrorBody, RowsPayload, TableDefinition, TablePayload};
use crate::error::{PipelineError, Result};
use crate::schema::Resource;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default target schema on the platform
pub const DEFAULT_SCHEMA: &str = "model_draft";

/// Connection options for the platform API
///
/// Built once at process start from the application configuration and
/// passed by reference into [`ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ApiOptions {
    /// Platform base URL, e.g. `http://127.0.0.1:8000`
    pub base_url: String,

    /// Target schema holding the tables
    pub schema: String,

    /// API token for the Authorization header, if any
    pub api_token: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiOptions {
    /// Options with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            schema: DEFAULT_SCHEMA.to_string(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Capability interface for table creation
///
/// Lets the schema-DDL implementation be swapped without touching the
/// schema mapper or the uploader.
#[async_trait]
pub trait TableCreator {
    /// Create the table described by a mapped resource
    async fn create_table(&self, resource: &Resource) -> Result<()>;
}

/// API client for the open-data platform
pub struct ApiClient {
    client: Client,
    base_url: String,
    schema: String,
    api_token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(options: &ApiOptions) -> Result<Self> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            schema: options.schema.clone(),
            api_token: options.api_token.clone(),
        })
    }

    /// The base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The target schema
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Check whether a table exists on the platform
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let url = endpoints::table_url(&self.base_url, &self.schema, table);
        let response = self.authorized(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(response_error(response).await),
        }
    }

    /// Post one chunk of serialized rows to a table
    pub async fn post_chunk(&self, table: &str, rows: &[Map<String, Value>]) -> Result<()> {
        let url = endpoints::rows_url(&self.base_url, &self.schema, table);
        debug!(table = %table, rows = rows.len(), "posting chunk");

        let response = self
            .authorized(self.client.post(&url))
            .json(&RowsPayload { query: rows })
            .send()
            .await?;

        ensure_success(response).await
    }

    /// Upload a table's metadata document
    pub async fn post_metadata(&self, table: &str, metadata: &Value) -> Result<()> {
        let url = endpoints::metadata_url(&self.base_url, &self.schema, table);

        let response = self
            .authorized(self.client.post(&url))
            .json(metadata)
            .send()
            .await?;

        ensure_success(response).await
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("Authorization", format!("Token {token}")),
            None => request,
        }
    }
}

#[async_trait]
impl TableCreator for ApiClient {
    async fn create_table(&self, resource: &Resource) -> Result<()> {
        let url = endpoints::table_url(&self.base_url, &self.schema, &resource.name);
        let payload = TablePayload {
            query: TableDefinition::from_resource(resource),
        };
        debug!(table = %resource.name, columns = resource.columns.len(), "creating table");

        let response = self
            .authorized(self.client.put(&url))
            .json(&payload)
            .send()
            .await?;

        ensure_success(response).await
    }
}

/// Turn a non-2xx response into the matching typed error
async fn ensure_success(response: Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(response_error(response).await)
}

async fn response_error(response: Response) -> PipelineError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message().map(str::to_string))
        .unwrap_or(text);

    if status.is_server_error() {
        PipelineError::transient(format!("server returned {status}: {detail}"))
    } else {
        PipelineError::ApiRejected {
            status: status.as_u16(),
            detail,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let options = ApiOptions::new("http://localhost:8000/");
        let client = ApiClient::new(&options).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.schema(), DEFAULT_SCHEMA);
    }

    #[test]
    fn test_options_defaults() {
        let options = ApiOptions::new("http://localhost:8000");
        assert_eq!(options.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(options.api_token.is_none());
    }
}
