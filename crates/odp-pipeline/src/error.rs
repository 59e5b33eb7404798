//! Error types for the upload pipeline
//!
//! Mapping errors (invalid names, collisions, malformed datapackages) abort
//! before any network call is made. Upload errors are split into transient
//! failures, which the uploader retries, and rejections, which abort the
//! affected table's remaining chunks.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Error type for the upload pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An identifier has nothing left after normalization
    #[error("Invalid identifier '{0}': nothing remains after normalizing to the platform's character set.")]
    InvalidName(String),

    /// Two distinct column names collapse to the same normalized name
    #[error("Name collision: '{first}' and '{second}' both normalize to '{normalized}'. Rename one of the columns in the datapackage.")]
    NameCollision {
        first: String,
        second: String,
        normalized: String,
    },

    /// The datapackage file is structurally unusable
    #[error("Invalid datapackage: {0}")]
    InvalidDatapackage(String),

    /// Foreign-key declarations form a cycle
    #[error("Foreign-key cycle among tables: {0}. Break the cycle or upload the tables manually.")]
    ForeignKeyCycle(String),

    /// The platform rejected a chunk's shape (non-retriable)
    #[error("Table '{table}' rejected chunk {chunk}: {detail}")]
    SchemaMismatch {
        table: String,
        chunk: usize,
        detail: String,
    },

    /// A retriable network or server failure
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The platform refused a request (non-retriable)
    #[error("Platform rejected request ({status}): {detail}")]
    ApiRejected { status: u16, detail: String },

    /// The retry budget is exhausted or a rejection aborted the table
    #[error("Upload of '{table}' aborted at chunk {chunk} (row offset {row_offset}): {cause}")]
    FatalUpload {
        table: String,
        chunk: usize,
        row_offset: u64,
        cause: String,
    },

    /// File system operation failed
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request failed before a response was received
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl PipelineError {
    /// Create an invalid-datapackage error
    pub fn invalid_datapackage(msg: impl Into<String>) -> Self {
        Self::InvalidDatapackage(msg.into())
    }

    /// Create a transient error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    /// Whether the uploader may retry the failed operation
    ///
    /// Connection-level failures and server 5xx responses are transient;
    /// everything else aborts the table.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Transient(_) => true,
            PipelineError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
