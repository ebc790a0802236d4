//! End-to-end tests of the query service against a SQLite file
//!
//! Each test builds its own temp directory holding `instances.json` and
//! `app.db`, the same layout the server is deployed with.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use sql_context_mcp::config::DatabaseConfig;
use sql_context_mcp::{Database, InstanceRegistry, QueryService, ToolError};

fn database_at(path: &Path) -> Arc<Database> {
    Arc::new(Database::new(&DatabaseConfig {
        path: path.to_path_buf(),
        timeout_secs: 1,
        connect_attempts: 2,
        retry_backoff_ms: 0,
    }))
}

async fn setup(dir: &Path) -> QueryService {
    std::fs::write(
        dir.join("instances.json"),
        r#"[
            {"id": "42", "allowedTables": ["orders"]},
            {"id": "sales", "allowedTables": ["orders", "customers", "archived"]}
        ]"#,
    )
    .unwrap();

    let database = database_at(&dir.join("app.db"));
    for sql in [
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL)",
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
        "CREATE TABLE audit_log (id INTEGER PRIMARY KEY, entry TEXT)",
    ] {
        database.execute_query(sql).await.unwrap();
    }

    QueryService::new(InstanceRegistry::new(dir.join("instances.json")), database, None)
}

#[tokio::test]
async fn context_is_scoped_to_instance() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    let context = service.get_database_context(Some("42")).await.unwrap();
    assert!(context.contains("orders"));
    assert!(!context.contains("customers"));
    assert!(!context.contains("audit_log"));

    let context = service.get_database_context(Some("sales")).await.unwrap();
    assert!(context.contains("Table: orders"));
    assert!(context.contains("Table: customers"));
    assert!(!context.contains("archived"));
    assert!(!context.contains("audit_log"));
}

#[tokio::test]
async fn unknown_instance_reports_available_ids() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    let err = service.get_database_context(Some("99")).await.unwrap_err();
    assert_eq!(err.kind(), "not_found");
    assert_eq!(
        err.to_string(),
        "Invalid instance ID '99'. Available IDs: 42, sales"
    );
}

#[tokio::test]
async fn missing_instance_id() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    let err = service.get_database_context(None).await.unwrap_err();
    assert!(matches!(err, ToolError::MissingParameter));
    assert_eq!(err.to_string(), "No instance_id found in request");
}

#[tokio::test]
async fn execute_round_trip_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    service
        .execute_query("INSERT INTO customers (name) VALUES ('Ada'), ('Grace')")
        .await
        .unwrap();

    service.database().disconnect().await;

    let result = service
        .execute_query("SELECT id, name FROM customers ORDER BY id")
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(result).unwrap(),
        json!({ "data": [
            { "id": 1, "name": "Ada" },
            { "id": 2, "name": "Grace" }
        ]})
    );
}

#[tokio::test]
async fn select_one() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    let result = service.execute_query("SELECT 1").await.unwrap();
    assert_eq!(serde_json::to_value(result).unwrap(), json!({ "data": [{ "1": 1 }] }));
}

#[tokio::test]
async fn drafting_without_key_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path()).await;

    let err = service
        .generate_sql_query("total revenue by customer", Some("sales"))
        .await
        .unwrap_err();
    assert_eq!(err.to_payload(), json!({ "error": "OpenAI API key not configured" }));
}
