//! SQL Context MCP Server implementation
//!
//! Every tool answers with a successful result; failures are carried in the
//! payload so the calling model sees them.

use mcp_common::{error_payload, json_success, query_param, text_success, CallToolResult, McpError};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router, RoleServer,
};

use crate::error::ToolError;
use crate::params::{ExecuteQueryParams, GenerateSqlParams};
use crate::service::QueryService;

/// Query parameter naming the caller's instance
pub const INSTANCE_ID_PARAM: &str = "instance_id";

/// SQL Context MCP Server
#[derive(Clone)]
pub struct SqlContextMcpServer {
    service: QueryService,
    tool_router: ToolRouter<Self>,
}

impl SqlContextMcpServer {
    pub fn new(service: QueryService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    fn log_failure(tool: &str, err: &ToolError) {
        tracing::error!(tool, kind = err.kind(), "Tool failed: {}", err);
    }
}

/// Render a failed SQL draft
///
/// An instance that cannot be resolved reads as `Error: ...` text; a missing
/// credential or a failed call reads as `{"error": ...}`.
fn draft_failure(err: &ToolError) -> Result<CallToolResult, McpError> {
    match err {
        ToolError::MissingParameter | ToolError::NotFound { .. } | ToolError::Registry(_) => {
            Ok(text_success(format!("Error: {}", err)))
        }
        ToolError::ConfigurationMissing | ToolError::Execution(_) => json_success(&err.to_payload()),
    }
}

#[tool_router]
impl SqlContextMcpServer {
    #[tool(description = "Generate a SQL query based on the user's request and allowed tables")]
    async fn generate_sql_query(
        &self,
        Parameters(params): Parameters<GenerateSqlParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let instance_id = query_param(&context, INSTANCE_ID_PARAM);

        match self
            .service
            .generate_sql_query(&params.query, instance_id.as_deref())
            .await
        {
            Ok(draft) => json_success(&draft),
            Err(err) => {
                Self::log_failure("generate_sql_query", &err);
                draft_failure(&err)
            }
        }
    }

    #[tool(description = "Get the database context filtered by instance allowed tables")]
    async fn get_database_context(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let instance_id = query_param(&context, INSTANCE_ID_PARAM);

        match self.service.get_database_context(instance_id.as_deref()).await {
            Ok(schema) => Ok(text_success(schema)),
            Err(err) => {
                Self::log_failure("get_database_context", &err);
                Ok(text_success(format!("Error: {}", err)))
            }
        }
    }

    #[tool(description = "Execute a query on the database")]
    async fn execute_query(
        &self,
        Parameters(params): Parameters<ExecuteQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.service.execute_query(&params.query).await {
            Ok(result) => json_success(&result),
            Err(err) => {
                Self::log_failure("execute_query", &err);
                error_payload(err.to_string())
            }
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for SqlContextMcpServer {
    fn get_info(&self) -> ServerInfo {
        let drafting = if self.service.has_model() {
            "enabled"
        } else {
            "disabled (no API key)"
        };
        ServerInfo {
            instructions: Some(format!(
                "SQL helper MCP server scoped by the `instance_id` query parameter. \
                Use get_database_context to see the tables this instance may use, \
                generate_sql_query to draft SQL from a request (SQL drafting {}), \
                and execute_query to run SQL.",
                drafting
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
