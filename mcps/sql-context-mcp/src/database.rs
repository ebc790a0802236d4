//! SQLite access: schema context rendering and query execution
//!
//! A single connection is owned by [`Database`] and opened lazily. Before each
//! use it is health-checked; a missing or dead connection is re-opened with a
//! bounded number of attempts.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{types::Value as SqlValue, Connection};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::config::DatabaseConfig;
use crate::error::DatabaseError;

/// One row of a result set, column name to value, in column order
pub type Record = Map<String, Value>;

/// Column layout used when rendering a table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub notnull: bool,
    pub pk: bool,
}

/// Owned database handle
pub struct Database {
    path: PathBuf,
    timeout: Duration,
    connect_attempts: u32,
    retry_backoff: Duration,
    conn: Mutex<Option<Connection>>,
}

impl Database {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            path: config.path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            connect_attempts: config.connect_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            conn: Mutex::new(None),
        }
    }

    /// Establish the connection now instead of on first use
    pub async fn connect(&self) -> Result<(), DatabaseError> {
        let mut slot = self.conn.lock().await;
        self.ensure_connected(&mut slot).await
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Drop the connection; the next operation reconnects
    pub async fn disconnect(&self) {
        self.conn.lock().await.take();
    }

    /// Render the layout of the given tables
    ///
    /// Tables are rendered in the order given; duplicates and names that do not
    /// exist are skipped. No tables renders as an empty string.
    pub async fn build_schema_context(&self, tables: &[String]) -> Result<String, DatabaseError> {
        let mut slot = self.conn.lock().await;
        self.ensure_connected(&mut slot).await?;
        let conn = slot.as_ref().ok_or_else(|| self.unavailable("connection dropped"))?;

        Ok(render_schema_context(conn, tables)?)
    }

    /// Execute any SQL statement and collect its rows
    ///
    /// Statements that produce no rows (including writes) yield an empty list.
    pub async fn execute_query(&self, sql: &str) -> Result<Vec<Record>, DatabaseError> {
        let mut slot = self.conn.lock().await;
        self.ensure_connected(&mut slot).await?;
        let conn = slot.as_ref().ok_or_else(|| self.unavailable("connection dropped"))?;

        tracing::debug!(sql, "Executing query");
        Ok(run_query(conn, sql)?)
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.timeout)?;
        Ok(conn)
    }

    fn unavailable(&self, reason: &str) -> DatabaseError {
        DatabaseError::Unavailable {
            attempts: self.connect_attempts,
            last_error: reason.to_string(),
        }
    }

    /// Delay before retrying after failed attempt `attempt`, saturating
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .checked_mul(attempt)
            .unwrap_or(Duration::MAX)
    }

    async fn ensure_connected(&self, slot: &mut Option<Connection>) -> Result<(), DatabaseError> {
        if let Some(conn) = slot.as_ref() {
            if conn.query_row("SELECT 1", [], |_| Ok(())).is_ok() {
                return Ok(());
            }
            tracing::warn!("Database connection failed health check, reconnecting");
            *slot = None;
        }

        let mut last_error = String::new();
        for attempt in 1..=self.connect_attempts {
            match self.open() {
                Ok(conn) => {
                    tracing::info!("Connected to database at {:?}", self.path);
                    *slot = Some(conn);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        attempts = self.connect_attempts,
                        "Failed to open database at {:?}: {}",
                        self.path,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < self.connect_attempts {
                        tokio::time::sleep(self.backoff_for(attempt)).await;
                    }
                }
            }
        }

        Err(DatabaseError::Unavailable {
            attempts: self.connect_attempts,
            last_error,
        })
    }
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                data_type: row.get(1)?,
                notnull: row.get::<_, i64>(2)? != 0,
                pk: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns)
}

fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1)",
        [table],
        |row| row.get(0),
    )
}

fn render_table(table: &str, columns: &[ColumnInfo]) -> String {
    let mut out = format!("Table: {}", table);
    for column in columns {
        let data_type = if column.data_type.is_empty() {
            "ANY"
        } else {
            column.data_type.as_str()
        };
        out.push_str(&format!("\n  - {} {}", column.name, data_type));
        if column.pk {
            out.push_str(" PRIMARY KEY");
        }
        if column.notnull {
            out.push_str(" NOT NULL");
        }
    }
    out
}

/// Render the permitted tables that exist, in the given order
pub fn render_schema_context(conn: &Connection, tables: &[String]) -> rusqlite::Result<String> {
    let mut seen = HashSet::new();
    let mut blocks = Vec::new();

    for table in tables {
        if !seen.insert(table.as_str()) || !table_exists(conn, table)? {
            continue;
        }
        let columns = table_columns(conn, table)?;
        blocks.push(render_table(table, &columns));
    }

    Ok(blocks.join("\n\n"))
}

fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

/// Run a statement and map every row to a record
pub fn run_query(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;

    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            let value: SqlValue = row.get(i)?;
            record.insert(name.clone(), to_json(value));
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn memory_db() -> Database {
        Database::new(&DatabaseConfig {
            path: PathBuf::from(":memory:"),
            timeout_secs: 1,
            connect_attempts: 1,
            retry_backoff_ms: 0,
        })
    }

    async fn seeded_db() -> Database {
        let db = memory_db();
        for sql in [
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, total REAL NOT NULL, note)",
            "CREATE TABLE users (id INTEGER PRIMARY KEY, email TEXT NOT NULL)",
            "CREATE TABLE secrets (token TEXT)",
        ] {
            db.execute_query(sql).await.unwrap();
        }
        db
    }

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_connects_lazily() {
        let db = memory_db();
        assert!(!db.is_connected().await);

        db.execute_query("SELECT 1").await.unwrap();
        assert!(db.is_connected().await);

        db.disconnect().await;
        assert!(!db.is_connected().await);
        db.execute_query("SELECT 1").await.unwrap();
        assert!(db.is_connected().await);
    }

    #[tokio::test]
    async fn test_select_one() {
        let db = memory_db();
        let rows = db.execute_query("SELECT 1").await.unwrap();
        assert_eq!(serde_json::to_value(rows).unwrap(), json!([{ "1": 1 }]));
    }

    #[tokio::test]
    async fn test_empty_result_is_empty_list() {
        let db = seeded_db().await;
        let rows = db.execute_query("SELECT * FROM orders").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_writes_are_executed() {
        let db = seeded_db().await;
        let inserted = db
            .execute_query("INSERT INTO orders (total, note) VALUES (9.5, 'gift'), (3.0, NULL)")
            .await
            .unwrap();
        assert!(inserted.is_empty());

        let rows = db
            .execute_query("SELECT id, total, note FROM orders ORDER BY id")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(rows).unwrap(),
            json!([
                { "id": 1, "total": 9.5, "note": "gift" },
                { "id": 2, "total": 3.0, "note": null }
            ])
        );
    }

    #[tokio::test]
    async fn test_record_keeps_column_order() {
        let db = memory_db();
        let rows = db.execute_query("SELECT 'z' AS zeta, 'a' AS alpha").await.unwrap();
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[tokio::test]
    async fn test_blob_is_summarised() {
        let db = memory_db();
        let rows = db.execute_query("SELECT x'00ff10' AS data").await.unwrap();
        assert_eq!(rows[0]["data"], json!("<blob 3 bytes>"));
    }

    #[tokio::test]
    async fn test_malformed_sql_is_error() {
        let db = memory_db();
        let err = db.execute_query("SELEC nonsense").await.unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }

    #[tokio::test]
    async fn test_schema_context_renders_only_allowed_tables() {
        let db = seeded_db().await;
        let context = db.build_schema_context(&tables(&["orders"])).await.unwrap();

        assert_eq!(
            context,
            "Table: orders\n  - id INTEGER PRIMARY KEY\n  - total REAL NOT NULL\n  - note ANY"
        );
        assert!(!context.contains("users"));
        assert!(!context.contains("secrets"));
    }

    #[tokio::test]
    async fn test_schema_context_order_duplicates_and_missing() {
        let db = seeded_db().await;
        let context = db
            .build_schema_context(&tables(&["users", "ghost", "orders", "users"]))
            .await
            .unwrap();

        assert_eq!(context.matches("Table: ").count(), 2);
        let users = context.find("Table: users").unwrap();
        let orders = context.find("Table: orders").unwrap();
        assert!(users < orders);
        assert!(!context.contains("ghost"));
    }

    #[tokio::test]
    async fn test_schema_context_empty() {
        let db = seeded_db().await;
        assert_eq!(db.build_schema_context(&[]).await.unwrap(), "");
        assert_eq!(db.build_schema_context(&tables(&["ghost"])).await.unwrap(), "");
    }

    #[test]
    fn test_backoff_grows_linearly_and_saturates() {
        let db = Database::new(&DatabaseConfig {
            retry_backoff_ms: 200,
            ..DatabaseConfig::default()
        });
        assert_eq!(db.backoff_for(1), Duration::from_millis(200));
        assert_eq!(db.backoff_for(3), Duration::from_millis(600));

        let db = Database::new(&DatabaseConfig {
            retry_backoff_ms: u64::MAX,
            ..DatabaseConfig::default()
        });
        assert_eq!(db.backoff_for(u32::MAX), Duration::MAX);
    }

    #[tokio::test]
    async fn test_unreachable_database_gives_up() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&DatabaseConfig {
            path: dir.path().join("missing").join("nested").join("db.sqlite"),
            timeout_secs: 1,
            connect_attempts: 2,
            retry_backoff_ms: 0,
        });

        match db.execute_query("SELECT 1").await {
            Err(DatabaseError::Unavailable { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected Unavailable, got {:?}", other.map(|r| r.len())),
        }
        assert!(!db.is_connected().await);
    }
}
