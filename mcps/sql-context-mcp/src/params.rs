//! Parameter types for SQL Context MCP tools
//!
//! `instance_id` is not a tool parameter: it is read from the query string
//! of the HTTP request that carries the call.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GenerateSqlParams {
    #[schemars(description = "Natural-language description of the data wanted")]
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteQueryParams {
    #[schemars(description = "SQL statement to execute against the database")]
    pub query: String,
}
