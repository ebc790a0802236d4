//! Error types for SQL Context MCP

use serde_json::{json, Value};
use thiserror::Error;

/// Failure to read the instance registry file
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read instances from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse instances from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database access failure
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database unavailable after {attempts} connection attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },
}

/// Failure of a tool operation
///
/// None of these reach the protocol layer as faults; they are rendered into
/// the tool's payload.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("No instance_id found in request")]
    MissingParameter,

    #[error("Invalid instance ID '{instance_id}'. Available IDs: {}", .available.join(", "))]
    NotFound {
        instance_id: String,
        available: Vec<String>,
    },

    #[error("OpenAI API key not configured")]
    ConfigurationMissing,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    /// Stable kind name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::MissingParameter => "missing_parameter",
            ToolError::NotFound { .. } => "not_found",
            ToolError::ConfigurationMissing => "configuration_missing",
            ToolError::Registry(_) => "registry",
            ToolError::Execution(_) => "execution_failure",
        }
    }

    /// `{"error": message}` payload for JSON-returning tools
    pub fn to_payload(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<DatabaseError> for ToolError {
    fn from(err: DatabaseError) -> Self {
        ToolError::Execution(err.to_string())
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        ToolError::Execution(format!("{:#}", err))
    }
}
