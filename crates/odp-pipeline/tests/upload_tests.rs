//! End-to-end tests for the chunked uploader against a mock platform
//!
//! These validate the ordering, retry, and abort semantics:
//! - chunks are posted strictly in sequence
//! - transient failures (5xx) retry the same chunk with backoff
//! - rejections (4xx) abort the table without touching later chunks

use odp_pipeline::api::{ApiClient, ApiOptions};
use odp_pipeline::datapackage::{FieldMeta, ResourceMeta, TableSchema};
use odp_pipeline::schema::{map_resource, NameMapping, Resource};
use odp_pipeline::source::RowSource;
use odp_pipeline::upload::{UploadSettings, Uploader};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROWS_PATH: &str = "/api/v0/schema/model_draft/tables/measurements/rows/new";

/// A resource with a single declared column; the id column is synthesized
fn measurements_resource() -> (Resource, NameMapping) {
    let meta = ResourceMeta {
        name: "measurements".to_string(),
        path: "data/measurements.csv".to_string(),
        dialect: None,
        schema: TableSchema {
            fields: vec![FieldMeta {
                name: "value".to_string(),
                data_type: "float".to_string(),
                description: None,
            }],
            primary_key: None,
            foreign_keys: Vec::new(),
        },
    };
    map_resource(&meta).expect("mapping must succeed")
}

/// Write a CSV with `rows` data rows into a temp file
fn csv_with_rows(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "value").expect("write header");
    for i in 0..rows {
        writeln!(file, "{}.5", i).expect("write row");
    }
    file.flush().expect("flush");
    file
}

fn test_settings(limit: usize) -> UploadSettings {
    UploadSettings {
        chunk_row_limit: limit,
        retry_base_delay: Duration::ZERO,
        ..UploadSettings::default()
    }
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&ApiOptions::new(server.uri())).expect("client")
}

#[tokio::test]
async fn test_150_rows_limit_50_posts_exactly_three_chunks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(3)
        .mount(&mock_server)
        .await;

    let (resource, mapping) = measurements_resource();
    let file = csv_with_rows(150);
    let source = RowSource::open(file.path(), b',').expect("open source");

    let client = client_for(&mock_server);
    let settings = test_settings(50);
    let report = Uploader::new(&client, &settings)
        .upload(&resource, &mapping, source)
        .await
        .expect("upload");

    assert_eq!(report.chunks_attempted, 3);
    assert_eq!(report.chunks_succeeded, 3);
    assert_eq!(report.rows_uploaded, 150);
    assert!(report.succeeded());

    // chunks arrive in order: the synthesized ids partition as 1..=50,
    // 51..=100, 101..=150
    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 3);
    let first = String::from_utf8_lossy(&requests[0].body).to_string();
    let last = String::from_utf8_lossy(&requests[2].body).to_string();
    assert!(first.contains("\"id\":1,"));
    assert!(!first.contains("\"id\":51,"));
    assert!(last.contains("\"id\":150,"));
}

#[tokio::test]
async fn test_transient_500_retries_same_chunk_then_succeeds() {
    let mock_server = MockServer::start().await;

    // the second chunk (ids 51..=100) fails twice, then the catch-all
    // mock below answers its third attempt
    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .and(body_string_contains("\"id\":51,"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let (resource, mapping) = measurements_resource();
    let file = csv_with_rows(150);
    let source = RowSource::open(file.path(), b',').expect("open source");

    let client = client_for(&mock_server);
    let settings = test_settings(50);
    let report = Uploader::new(&client, &settings)
        .upload(&resource, &mapping, source)
        .await
        .expect("upload");

    // retries are invisible in the outcome: 3/3 chunks, no failure
    assert_eq!(report.chunks_attempted, 3);
    assert_eq!(report.chunks_succeeded, 3);
    assert!(report.failure.is_none());

    // 5 requests total: chunk 0, chunk 1 three times, chunk 2
    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 5);
}

#[tokio::test]
async fn test_rejection_aborts_remaining_chunks() {
    let mock_server = MockServer::start().await;

    // the second chunk is rejected outright
    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .and(body_string_contains("\"id\":51,"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "reason": "column value does not accept the given input"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let (resource, mapping) = measurements_resource();
    let file = csv_with_rows(150);
    let source = RowSource::open(file.path(), b',').expect("open source");

    let client = client_for(&mock_server);
    let settings = test_settings(50);
    let report = Uploader::new(&client, &settings)
        .upload(&resource, &mapping, source)
        .await
        .expect("upload");

    assert_eq!(report.chunks_attempted, 2);
    assert_eq!(report.chunks_succeeded, 1);
    assert_eq!(report.rows_uploaded, 50);

    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.table, "measurements");
    assert_eq!(failure.chunk_index, 1);
    assert_eq!(failure.row_offset, 50);
    assert!(failure.cause.contains("does not accept"));

    // a 4xx is never retried and the third chunk is never attempted
    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_exhausted_retry_budget_aborts_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ROWS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (resource, mapping) = measurements_resource();
    let file = csv_with_rows(10);
    let source = RowSource::open(file.path(), b',').expect("open source");

    let client = client_for(&mock_server);
    let settings = test_settings(50);
    let report = Uploader::new(&client, &settings)
        .upload(&resource, &mapping, source)
        .await
        .expect("upload");

    assert_eq!(report.chunks_attempted, 1);
    assert_eq!(report.chunks_succeeded, 0);
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.chunk_index, 0);
    assert_eq!(failure.row_offset, 0);

    // exactly max_attempts requests for the one chunk
    let requests = mock_server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_dry_run_posts_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (resource, mapping) = measurements_resource();
    let file = csv_with_rows(120);
    let source = RowSource::open(file.path(), b',').expect("open source");

    let client = client_for(&mock_server);
    let settings = UploadSettings {
        dry_run: true,
        ..test_settings(50)
    };
    let report = Uploader::new(&client, &settings)
        .upload(&resource, &mapping, source)
        .await
        .expect("upload");

    assert_eq!(report.chunks_attempted, 3);
    assert_eq!(report.chunks_succeeded, 3);
    assert_eq!(report.rows_uploaded, 120);
    assert!(report.succeeded());
}
