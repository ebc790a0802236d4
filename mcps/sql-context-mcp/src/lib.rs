//! SQL Context MCP Library
//!
//! MCP tools over HTTP for language models working with a SQLite database.
//! Callers are scoped by an `instance_id` query parameter that selects the
//! tables whose layout is shown to the model.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sql_context_mcp::{Database, InstanceRegistry, QueryService, SqlContextConfig};
//!
//! let config = SqlContextConfig::load(None)?;
//! let service = QueryService::new(
//!     InstanceRegistry::new(&config.instances.path),
//!     Arc::new(Database::new(&config.database)),
//!     None,
//! );
//! let context = service.get_database_context(Some("42")).await?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod instances;
pub mod llm;
pub mod params;
pub mod server;
pub mod service;

// Re-export main server type
pub use server::SqlContextMcpServer;

pub use config::SqlContextConfig;
pub use database::Database;
pub use error::{DatabaseError, RegistryError, ToolError};
pub use instances::{Instance, InstanceRegistry};
pub use llm::{ChatModel, OpenAiClient};
pub use service::{QueryResult, QueryService, SqlDraft};

// Re-export parameter types for direct API usage
pub use params::{ExecuteQueryParams, GenerateSqlParams};
