//! Chunked data upload
//!
//! Streams a table's CSV source as row-bounded chunks and posts them to the
//! platform strictly in order. Chunk N+1 is never started before chunk N's
//! terminal outcome is known: the synthesized id sequence and the
//! platform's append-only insert order both depend on it.

use crate::api::ApiClient;
use crate::error::{PipelineError, Result};
use crate::schema::{NameMapping, Resource};
use crate::source::RowSource;
use csv::StringRecord;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default rows per upload chunk
pub const DEFAULT_CHUNK_ROW_LIMIT: usize = 500;

/// Default number of attempts per chunk (first try included)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Cell values treated as SQL NULL, compared case-insensitively
pub const DEFAULT_NULL_TOKENS: &[&str] = &["", "null", "none", "na", "nan", "n/a"];

/// Operational settings for an upload run
///
/// Fixed for the duration of a run; a new run may use different values.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    /// Maximum rows per chunk
    pub chunk_row_limit: usize,

    /// Attempts per chunk before the table is aborted
    pub max_attempts: u32,

    /// Base delay for linear retry backoff (delay = base * attempt)
    pub retry_base_delay: Duration,

    /// Cell values treated as NULL
    pub null_tokens: Vec<String>,

    /// Build and count chunks without posting anything
    pub dry_run: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_row_limit: DEFAULT_CHUNK_ROW_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay: Duration::from_secs(1),
            null_tokens: DEFAULT_NULL_TOKENS.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
        }
    }
}

/// A bounded, ordered slice of a table's rows
///
/// Indices are strictly increasing from 0; `row_offset` is the 0-based
/// offset of the chunk's first data row within the source file (header
/// excluded). Chunks are built lazily and consumed by exactly one
/// submission loop.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: usize,
    pub row_offset: u64,
    pub rows: Vec<Map<String, Value>>,
}

/// Splits a row source into upload-ready chunks
///
/// Applies the column name mapping (columns absent from the mapping are
/// dropped), converts null tokens and embedded JSON values, and synthesizes
/// the id column as a monotonically increasing integer starting at 1,
/// continued across chunks.
pub struct Chunker<'a> {
    source: RowSource,
    /// normalized name per source column, None for dropped columns
    column_names: Vec<Option<String>>,
    synthesize_id: bool,
    null_tokens: &'a [String],
    limit: usize,
    next_index: usize,
    next_offset: u64,
    next_id: u64,
}

impl<'a> Chunker<'a> {
    /// Create a chunker over an open row source
    pub fn new(source: RowSource, mapping: &NameMapping, settings: &'a UploadSettings) -> Self {
        let column_names = source
            .headers()
            .iter()
            .map(|header| mapping.get(header).map(str::to_string))
            .collect();

        Self {
            source,
            column_names,
            synthesize_id: mapping.synthesized_id(),
            null_tokens: &settings.null_tokens,
            limit: settings.chunk_row_limit.max(1),
            next_index: 0,
            next_offset: 0,
            next_id: 1,
        }
    }

    /// Next chunk, None when the source is exhausted
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let mut rows = Vec::with_capacity(self.limit);

        while rows.len() < self.limit {
            match self.source.next_record() {
                Some(record) => rows.push(self.convert_row(&record?)),
                None => break,
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }

        let chunk = Chunk {
            index: self.next_index,
            row_offset: self.next_offset,
            rows,
        };
        self.next_index += 1;
        self.next_offset += chunk.rows.len() as u64;

        Ok(Some(chunk))
    }

    fn convert_row(&mut self, record: &StringRecord) -> Map<String, Value> {
        let mut row = Map::with_capacity(self.column_names.len() + 1);

        if self.synthesize_id {
            row.insert("id".to_string(), Value::from(self.next_id));
            self.next_id += 1;
        }

        for (name, raw) in self.column_names.iter().zip(record.iter()) {
            if let Some(name) = name {
                row.insert(name.clone(), convert_value(raw, self.null_tokens));
            }
        }

        row
    }
}

/// Convert one CSV cell to its JSON wire value
///
/// Null tokens become JSON null; string-wrapped arrays and objects are
/// parsed when they are valid JSON; everything else passes through as a
/// trimmed string (the platform casts against the column type).
fn convert_value(raw: &str, null_tokens: &[String]) -> Value {
    let trimmed = raw.trim();

    if null_tokens.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
        return Value::Null;
    }

    let wrapped = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if wrapped {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            if value.is_array() || value.is_object() {
                return value;
            }
        }
    }

    Value::String(trimmed.to_string())
}

/// Outcome of one table's upload run
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Normalized table name
    pub table: String,

    /// Chunks for which a submission loop was started
    pub chunks_attempted: usize,

    /// Chunks acknowledged by the platform
    pub chunks_succeeded: usize,

    /// Rows acknowledged by the platform
    pub rows_uploaded: u64,

    /// First failure, if any; later chunks were never attempted
    pub failure: Option<UploadFailure>,
}

impl UploadReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            chunks_attempted: 0,
            chunks_succeeded: 0,
            rows_uploaded: 0,
            failure: None,
        }
    }

    /// Whether the whole table was uploaded
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// First failure of an upload run
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub table: String,
    pub chunk_index: usize,
    pub row_offset: u64,
    pub cause: String,
}

impl UploadFailure {
    /// The failure as a pipeline error
    pub fn to_error(&self) -> PipelineError {
        PipelineError::FatalUpload {
            table: self.table.clone(),
            chunk: self.chunk_index,
            row_offset: self.row_offset,
            cause: self.cause.clone(),
        }
    }
}

/// Streams one table's rows to the platform, chunk by chunk
pub struct Uploader<'a> {
    client: &'a ApiClient,
    settings: &'a UploadSettings,
}

impl<'a> Uploader<'a> {
    /// Create an uploader over a client and run settings
    pub fn new(client: &'a ApiClient, settings: &'a UploadSettings) -> Self {
        Self { client, settings }
    }

    /// Upload one table's data from an open row source
    ///
    /// Chunks are posted strictly in sequence. Transient failures retry the
    /// same chunk up to the attempt budget with linear backoff; a rejection
    /// or an exhausted budget aborts the table, leaving already-acknowledged
    /// chunks on the platform. The report records the first failure; a
    /// corrective re-run (with a fresh source) is the recovery path.
    pub async fn upload(
        &self,
        resource: &Resource,
        mapping: &NameMapping,
        source: RowSource,
    ) -> Result<UploadReport> {
        let mut chunker = Chunker::new(source, mapping, self.settings);
        let mut report = UploadReport::new(&resource.name);

        while let Some(chunk) = chunker.next_chunk()? {
            report.chunks_attempted += 1;

            if self.settings.dry_run {
                debug!(
                    table = %resource.name,
                    chunk = chunk.index,
                    rows = chunk.rows.len(),
                    "dry run: chunk not posted"
                );
                report.chunks_succeeded += 1;
                report.rows_uploaded += chunk.rows.len() as u64;
                continue;
            }

            match self.submit_with_retry(&resource.name, &chunk).await {
                Ok(()) => {
                    debug!(
                        table = %resource.name,
                        chunk = chunk.index,
                        rows = chunk.rows.len(),
                        "chunk uploaded"
                    );
                    report.chunks_succeeded += 1;
                    report.rows_uploaded += chunk.rows.len() as u64;
                },
                Err(cause) => {
                    error!(
                        table = %resource.name,
                        chunk = chunk.index,
                        row_offset = chunk.row_offset,
                        error = %cause,
                        "upload aborted"
                    );
                    report.failure = Some(UploadFailure {
                        table: resource.name.clone(),
                        chunk_index: chunk.index,
                        row_offset: chunk.row_offset,
                        cause: cause.to_string(),
                    });
                    break;
                },
            }
        }

        info!(
            table = %resource.name,
            chunks = report.chunks_succeeded,
            rows = report.rows_uploaded,
            ok = report.succeeded(),
            "upload finished"
        );

        Ok(report)
    }

    /// Post one chunk, retrying transient failures with linear backoff
    async fn submit_with_retry(&self, table: &str, chunk: &Chunk) -> Result<()> {
        let mut attempt: u32 = 1;

        loop {
            match self.client.post_chunk(table, &chunk.rows).await {
                Ok(()) => {
                    if attempt > 1 {
                        info!(table = %table, chunk = chunk.index, attempt, "chunk succeeded after retry");
                    }
                    return Ok(());
                },
                Err(e) if e.is_transient() && attempt < self.settings.max_attempts => {
                    let delay = self.settings.retry_base_delay * attempt;
                    warn!(
                        table = %table,
                        chunk = chunk.index,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, retrying chunk"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                // a rejected chunk means the data does not fit the table
                Err(PipelineError::ApiRejected { detail, .. }) => {
                    return Err(PipelineError::SchemaMismatch {
                        table: table.to_string(),
                        chunk: chunk.index,
                        detail,
                    });
                },
                Err(e) => return Err(e),
            }
        }
    }
}
