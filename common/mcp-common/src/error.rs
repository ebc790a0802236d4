//! Error handling utilities for MCP servers
//!
//! Tools in this workspace report domain failures inside their payloads (see
//! [`crate::error_payload`]). The helpers here are for the remaining cases
//! where the protocol layer itself has to fail, such as a payload that cannot
//! be serialized.

use rmcp::ErrorData as McpError;

/// Trait for converting errors into MCP-compatible errors
pub trait IntoMcpError {
    /// Convert this error into an MCP error
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        McpError::internal_error(format!("JSON error: {}", self), None)
    }
}

/// Extension trait for Result types to convert to MCP errors
///
/// ```rust,ignore
/// use mcp_common::ResultExt;
///
/// let json = serde_json::to_string(&payload).to_mcp_err()?;
/// ```
pub trait ResultExt<T> {
    /// Convert the error to an MCP error
    fn to_mcp_err(self) -> Result<T, McpError>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> Result<T, McpError> {
        self.map_err(|e| e.into_mcp_error())
    }
}
