//! SQL Context MCP Server
//!
//! Serves the schema-context, SQL drafting and SQL execution tools over the
//! streamable HTTP transport.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mcp_common::HttpServeOptions;
use sql_context_mcp::{
    http, ChatModel, Database, InstanceRegistry, OpenAiClient, QueryService, SqlContextConfig,
    SqlContextMcpServer,
};

#[derive(Debug, Parser)]
#[command(name = "sql-context-mcp", about = "SQL helper MCP server over HTTP")]
struct Args {
    /// Path to a TOML config file
    #[arg(long, env = "SQL_CONTEXT_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(long, env = "SQL_CONTEXT_BIND")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal
    dotenv::dotenv().ok();

    let args = Args::parse();

    mcp_common::init_tracing("sql_context_mcp")?;
    tracing::info!("Starting sql_context_mcp MCP Server");

    let config = SqlContextConfig::load(args.config.as_deref())?;

    let database = Arc::new(Database::new(&config.database));
    if let Err(e) = database.connect().await {
        tracing::warn!("Database not reachable at startup, will retry on first use: {}", e);
    }

    let model: Option<Arc<dyn ChatModel>> =
        match OpenAiClient::from_config(&config.model, config.api_key()) {
            Some(client) => Some(Arc::new(client)),
            None => {
                tracing::warn!(
                    "{} not found in environment variables, SQL drafting disabled",
                    config.model.api_key_env
                );
                None
            }
        };

    let registry = InstanceRegistry::new(&config.instances.path);
    tracing::info!("Reading instances from {}", registry.path().display());

    let server = SqlContextMcpServer::new(QueryService::new(registry, database, model));

    let options = HttpServeOptions {
        bind: args.bind.unwrap_or(config.server.bind),
        mount_path: config.server.mount_path.clone(),
    };

    mcp_common::serve_http(move || server.clone(), options, http::routes()).await
}
