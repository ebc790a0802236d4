//! Result helpers for MCP tool responses
//!
//! Provides convenient functions for creating `CallToolResult` responses,
//! reducing boilerplate in tool implementations.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::ResultExt;

/// Create a successful JSON response from any serializable data
///
/// This replaces the common pattern:
/// ```rust,ignore
/// let json = serde_json::to_string_pretty(&data)
///     .map_err(|e| McpError::internal_error(e.to_string(), None))?;
/// Ok(CallToolResult::success(vec![Content::text(json)]))
/// ```
///
/// With simply:
/// ```rust,ignore
/// json_success(&data)
/// ```
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data).to_mcp_err()?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Create a successful plain text response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Report a failure inside a successful response as `{"error": message}`
///
/// Tool callers are language models; a protocol-level error is often
/// swallowed by the client, while an in-band payload is shown to the model.
pub fn error_payload(message: impl Into<String>) -> Result<CallToolResult, McpError> {
    json_success(&serde_json::json!({ "error": message.into() }))
}
