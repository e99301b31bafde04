//! Integration tests using mock HTTP servers
//!
//! Tests the full end-to-end flow: processing config → source API pages →
//! dataset API calls, with both APIs served by wiremock.

use api_dataset_sync::config::ConfigFormat;
use api_dataset_sync::dataset::{
    DatasetApiConfig, FileConfigPatcher, HttpDatasetApi, JournalWaiter,
};
use api_dataset_sync::{
    load_config, load_config_from_str, DatasetMode, Error, ProcessingConfig, SyncOrchestrator,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

struct Servers {
    source: MockServer,
    datasets: MockServer,
}

impl Servers {
    async fn start() -> Self {
        Self {
            source: MockServer::start().await,
            datasets: MockServer::start().await,
        }
    }

    fn api_config(&self) -> DatasetApiConfig {
        DatasetApiConfig::new(self.datasets.uri()).with_api_key("dataset-key")
    }

    fn orchestrator(&self, config: ProcessingConfig) -> SyncOrchestrator {
        let api_config = self.api_config();
        let waiter = JournalWaiter::new(&api_config)
            .unwrap()
            .with_poll_interval(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(1));
        SyncOrchestrator::new(
            config,
            Arc::new(HttpDatasetApi::new(&api_config).unwrap()),
            Arc::new(waiter),
        )
    }

    /// Journal holding one finalize entry, enough for the wait after creation
    async fn mount_finalized_journal(&self, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/datasets/{id}/journal")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type": "finalize-end", "date": "2024-05-01T08:00:00.000Z"}
            ])))
            .mount(&self.datasets)
            .await;
    }

    /// Journal that gains a finalize entry after `stale_reads` reads
    ///
    /// The new entry is dated before the existing one, as with a dataset
    /// service whose clock lags behind.
    async fn mount_growing_journal(&self, id: &str, stale_reads: u64) {
        let old = json!({"type": "finalize-end", "date": "2024-05-01T08:00:00.000Z"});
        let new = json!({"type": "finalize-end", "date": "2000-01-01T00:00:00.000Z"});
        Mock::given(method("GET"))
            .and(path(format!("/datasets/{id}/journal")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([old.clone()])))
            .up_to_n_times(stale_reads)
            .mount(&self.datasets)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/datasets/{id}/journal")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([new, old])))
            .mount(&self.datasets)
            .await;
    }

    async fn mount_bulk(&self, id: &str, times: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/datasets/{id}/_bulk_lines")))
            .and(header("x-apiKey", "dataset-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"nbOk": 1, "nbNotModified": 0, "nbErrors": 0, "errors": []})),
            )
            .expect(times)
            .mount(&self.datasets)
            .await;
    }

    async fn mount_existing(&self, id: &str, schema: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/datasets/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "title": "Items",
                "isRest": true,
                "primaryKey": ["id"],
                "schema": schema
            })))
            .mount(&self.datasets)
            .await;
    }
}

fn explicit_yaml(api_url: &str) -> String {
    format!(
        r#"
apiURL: {api_url}
dataset:
  title: Items
columns:
  - columnPath: id
    columnType: Nombre entier
    isPrimaryKey: true
  - columnPath: name
    columnType: Texte
"#
    )
}

fn stored_schema() -> serde_json::Value {
    json!([
        {"key": "id", "type": "integer", "title": "id"},
        {"key": "name", "type": "string", "title": "name"}
    ])
}

// ============================================================================
// Create Mode
// ============================================================================

#[tokio::test]
async fn test_explicit_create_two_pages() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}],
            "links": {"next": "/items2"}
        })))
        .expect(1)
        .mount(&servers.source)
        .await;
    Mock::given(method("GET"))
        .and(path("/items2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 3, "name": "c"}]
        })))
        .expect(1)
        .mount(&servers.source)
        .await;

    Mock::given(method("POST"))
        .and(path("/datasets"))
        .and(header("x-apiKey", "dataset-key"))
        .and(body_string_contains("\"isRest\":true"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true,
            "primaryKey": ["id"],
            "schema": stored_schema()
        })))
        .expect(1)
        .mount(&servers.datasets)
        .await;
    servers.mount_finalized_journal("items-abc").await;
    servers.mount_bulk("items-abc", 2).await;

    let mut config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();
    config.result_path = Some("results".to_string());
    config.pagination = Some(api_dataset_sync::pagination::PaginationConfig::next_page_data(
        "links.next",
    ));

    let report = servers.orchestrator(config).run().await.unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.lines, 3);
    assert_eq!(report.uploaded, 3);
    assert_eq!(report.schema_updates, 0);
    let patch = report.config_patch.unwrap();
    assert_eq!(patch.dataset_mode, DatasetMode::Update);
    assert_eq!(patch.dataset.id, "items-abc");
}

#[tokio::test]
async fn test_create_then_update_is_idempotent() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "a"}])),
        )
        .expect(2)
        .mount(&servers.source)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true,
            "schema": stored_schema()
        })))
        .expect(1)
        .mount(&servers.datasets)
        .await;
    servers.mount_existing("items-abc", stored_schema()).await;
    Mock::given(method("POST"))
        .and(path("/datasets/items-abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&servers.datasets)
        .await;
    servers.mount_finalized_journal("items-abc").await;
    servers.mount_bulk("items-abc", 2).await;

    let mut config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();

    let first = servers.orchestrator(config.clone()).run().await.unwrap();
    let patch = first.config_patch.unwrap();
    config.dataset_mode = patch.dataset_mode;
    config.dataset.id = Some(patch.dataset.id);

    let second = servers.orchestrator(config).run().await.unwrap();
    assert_eq!(second.schema_updates, 0);
    assert_eq!(second.config_patch, None);
    assert_eq!(second.uploaded, 1);
}

#[tokio::test]
async fn test_create_writes_dataset_back_to_config_file() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&servers.source)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true
        })))
        .mount(&servers.datasets)
        .await;
    servers.mount_finalized_journal("items-abc").await;
    servers.mount_bulk("items-abc", 1).await;

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        "{}",
        explicit_yaml(&format!("{}/items", servers.source.uri()))
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    servers
        .orchestrator(config)
        .with_patcher(Arc::new(FileConfigPatcher::new(file.path())))
        .run()
        .await
        .unwrap();

    let reloaded = load_config(file.path()).unwrap();
    assert_eq!(reloaded.dataset_mode, DatasetMode::Update);
    assert_eq!(reloaded.dataset_id(), Some("items-abc"));
    assert_eq!(reloaded.columns.len(), 2);
}

// ============================================================================
// Update Mode
// ============================================================================

#[tokio::test]
async fn test_update_type_change_is_fatal() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(0)
        .mount(&servers.source)
        .await;
    servers
        .mount_existing(
            "items-abc",
            json!([
                {"key": "id", "type": "string", "title": "id"},
                {"key": "name", "type": "string", "title": "name"}
            ]),
        )
        .await;
    servers.mount_bulk("items-abc", 0).await;

    let mut config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();
    config.dataset_mode = DatasetMode::Update;
    config.dataset.id = Some("items-abc".to_string());

    let err = servers.orchestrator(config).run().await.unwrap_err();

    match err {
        Error::SchemaIncompatible { key, message } => {
            assert_eq!(key, "id");
            assert!(message.contains("integer"));
        }
        other => panic!("Expected SchemaIncompatible, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_new_column_with_force_update() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "a"}])),
        )
        .expect(1)
        .mount(&servers.source)
        .await;
    servers
        .mount_existing(
            "items-abc",
            json!([{"key": "id", "type": "integer", "title": "id"}]),
        )
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets/items-abc"))
        .and(header("x-apiKey", "dataset-key"))
        .and(body_string_contains("\"key\":\"name\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "schema": stored_schema()
        })))
        .expect(1)
        .mount(&servers.datasets)
        .await;
    // read once before the schema update, then polled
    servers.mount_growing_journal("items-abc", 1).await;
    servers.mount_bulk("items-abc", 1).await;

    let mut config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();
    config.dataset_mode = DatasetMode::Update;
    config.dataset.id = Some("items-abc".to_string());
    config.force_update = true;

    let report = servers.orchestrator(config).run().await.unwrap();
    assert_eq!(report.schema_updates, 1);
    assert_eq!(report.uploaded, 1);
}

#[tokio::test]
async fn test_update_missing_dataset_is_fatal() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/datasets/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&servers.datasets)
        .await;

    let mut config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();
    config.dataset_mode = DatasetMode::Update;
    config.dataset.id = Some("gone".to_string());

    let err = servers.orchestrator(config).run().await.unwrap_err();
    assert!(err.to_string().contains("gone"));
}

#[tokio::test]
async fn test_finalize_timeout_aborts_before_upload() {
    let servers = Servers::start().await;

    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true
        })))
        .mount(&servers.datasets)
        .await;
    Mock::given(method("GET"))
        .and(path("/datasets/items-abc/journal"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&servers.datasets)
        .await;
    servers.mount_bulk("items-abc", 0).await;

    let config = load_config_from_str(
        &explicit_yaml(&format!("{}/items", servers.source.uri())),
        ConfigFormat::Yaml,
    )
    .unwrap();

    let api_config = servers.api_config();
    let waiter = JournalWaiter::new(&api_config)
        .unwrap()
        .with_poll_interval(Duration::from_millis(10))
        .with_timeout(Duration::from_millis(50));
    let err = SyncOrchestrator::new(
        config,
        Arc::new(HttpDatasetApi::new(&api_config).unwrap()),
        Arc::new(waiter),
    )
    .run()
    .await
    .unwrap_err();

    assert!(matches!(err, Error::FinalizeTimeout { .. }));
}

// ============================================================================
// Inferred Mode
// ============================================================================

#[tokio::test]
async fn test_inferred_create_detects_dates() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "day": "2024-01-01T00:00:00.000Z", "at": "2024-01-01T10:30:00.000Z"}
        ])))
        .expect(1)
        .mount(&servers.source)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .and(body_string_contains("\"schema\":[]"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "events",
            "title": "Events",
            "isRest": true,
            "schema": []
        })))
        .expect(1)
        .mount(&servers.datasets)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets/events"))
        .and(body_string_contains("\"format\":\"date\""))
        .and(body_string_contains("\"format\":\"date-time\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "events"})))
        .expect(1)
        .mount(&servers.datasets)
        .await;
    // creation wait, then the read before the schema update
    servers.mount_growing_journal("events", 2).await;
    servers.mount_bulk("events", 1).await;

    let yaml = format!(
        "apiURL: {}/events\ndataset:\n  title: Events\ndetectSchema: true\n",
        servers.source.uri()
    );
    let config = load_config_from_str(&yaml, ConfigFormat::Yaml).unwrap();

    let report = servers.orchestrator(config).run().await.unwrap();
    assert_eq!(report.schema_updates, 1);
    assert_eq!(report.lines, 1);
}

// ============================================================================
// Pagination and Auth
// ============================================================================

#[tokio::test]
async fn test_query_params_short_page_ends_pagination() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("offset", "0"))
        .and(query_param("size", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .expect(1)
        .mount(&servers.source)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(1)
        .mount(&servers.source)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true
        })))
        .mount(&servers.datasets)
        .await;
    servers.mount_finalized_journal("items-abc").await;
    servers.mount_bulk("items-abc", 2).await;

    let yaml = format!(
        r#"{}pagination:
  method: queryParams
  offsetKey: offset
  offsetFrom0: true
  limitKey: size
  limitValue: 2
"#,
        explicit_yaml(&format!("{}/items", servers.source.uri()))
    );
    let config = load_config_from_str(&yaml, ConfigFormat::Yaml).unwrap();

    let report = servers.orchestrator(config).run().await.unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(report.lines, 3);
}

#[tokio::test]
async fn test_legacy_authorization_header_reaches_source() {
    let servers = Servers::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("Authorization", "Token abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&servers.source)
        .await;
    Mock::given(method("POST"))
        .and(path("/datasets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "items-abc",
            "title": "Items",
            "isRest": true
        })))
        .mount(&servers.datasets)
        .await;
    servers.mount_finalized_journal("items-abc").await;
    servers.mount_bulk("items-abc", 1).await;

    let yaml = format!(
        "{}authorizationHeader: Token abc\n",
        explicit_yaml(&format!("{}/items", servers.source.uri()))
    );
    let config = load_config_from_str(&yaml, ConfigFormat::Yaml).unwrap();

    servers.orchestrator(config).run().await.unwrap();
}
