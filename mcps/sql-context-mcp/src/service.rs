//! Query service: the operations behind the MCP tools
//!
//! Each operation returns a typed result. The MCP layer decides how failures
//! are rendered to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::database::{Database, Record};
use crate::error::ToolError;
use crate::instances::InstanceRegistry;
use crate::llm::ChatModel;

/// System prompt for SQL drafting
pub const SQL_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates SQL queries based on the user's request.";

/// Model reply to a natural-language request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlDraft {
    pub sql_query: String,
}

/// Rows produced by a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub data: Vec<Record>,
}

/// Shared state for the tools
#[derive(Clone)]
pub struct QueryService {
    registry: InstanceRegistry,
    database: Arc<Database>,
    model: Option<Arc<dyn ChatModel>>,
}

impl QueryService {
    pub fn new(
        registry: InstanceRegistry,
        database: Arc<Database>,
        model: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        Self {
            registry,
            database,
            model,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Ask the model for SQL answering `query`, grounded in the instance's tables
    pub async fn generate_sql_query(
        &self,
        query: &str,
        instance_id: Option<&str>,
    ) -> Result<SqlDraft, ToolError> {
        let model = self.model.as_ref().ok_or(ToolError::ConfigurationMissing)?;

        let instance = self.registry.resolve(instance_id)?;
        let context = self
            .database
            .build_schema_context(&instance.allowed_tables)
            .await?;

        let user = format!("User request: {}\n\nDatabase context: {}", query, context);
        let sql_query = model.complete(SQL_SYSTEM_PROMPT, &user).await?;

        tracing::info!(
            instance_id = %instance.id,
            model = model.model(),
            "Drafted SQL query"
        );

        Ok(SqlDraft { sql_query })
    }

    /// Schema context for the instance's permitted tables
    pub async fn get_database_context(&self, instance_id: Option<&str>) -> Result<String, ToolError> {
        let instance = self.registry.resolve(instance_id)?;
        Ok(self
            .database
            .build_schema_context(&instance.allowed_tables)
            .await?)
    }

    /// Run `sql` as given and return its rows
    ///
    /// Not scoped to any instance.
    pub async fn execute_query(&self, sql: &str) -> Result<QueryResult, ToolError> {
        let data = self.database.execute_query(sql).await?;
        tracing::debug!(rows = data.len(), "Query executed");
        Ok(QueryResult { data })
    }
}
