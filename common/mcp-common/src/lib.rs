//! MCP Common - Shared utilities for MCP servers served over HTTP
//!
//! This crate provides common functionality used by the MCP servers in this
//! workspace:
//!
//! - **Initialization**: [`init_tracing`] and [`serve_http`] for standardized
//!   server startup on the streamable HTTP transport
//! - **Requests**: [`query_param`] to read the query string of the HTTP request
//!   that carried a tool call
//! - **Results**: Helper functions for creating `CallToolResult` responses,
//!   including in-band error payloads
//! - **Errors**: Traits for converting errors to MCP-compatible format
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::{json_success, query_param};
//!
//! #[tool(description = "Echo the caller's tenant")]
//! async fn whoami(&self, context: RequestContext<RoleServer>) -> Result<CallToolResult, McpError> {
//!     let tenant = query_param(&context, "tenant");
//!     json_success(&tenant)
//! }
//! ```

pub mod error;
pub mod init;
pub mod request;
pub mod result;

// Re-export commonly used items at crate root
pub use error::{IntoMcpError, ResultExt};
pub use init::{build_router, init_tracing, serve_http, HttpServeOptions};
pub use request::{query_param, query_param_from_parts};
pub use result::{error_payload, json_success, text_success};

// Re-export rmcp types that are commonly needed
pub use rmcp::{model::CallToolResult, ErrorData as McpError};
