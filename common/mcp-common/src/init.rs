//! Server initialization utilities
//!
//! Provides standardized tracing setup and hosting of an MCP server on the
//! streamable HTTP transport, nested inside an axum router.

use std::net::SocketAddr;

use axum::Router;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging for MCP servers
///
/// Sets up logging to stderr with:
/// - Formatted output without ANSI colors (for clean logs)
/// - Environment-based filtering via RUST_LOG
/// - Default log level of `info` for the specified crate
///
/// Set `LOG_FORMAT=json` for structured JSON output (useful for production/log aggregation).
/// Default is human-readable text output.
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Where and under which path an MCP server is exposed
#[derive(Debug, Clone)]
pub struct HttpServeOptions {
    /// Socket address to bind
    pub bind: SocketAddr,
    /// Path prefix the MCP endpoint is nested under, e.g. `/llm`
    pub mount_path: String,
}

/// Build the axum router hosting an MCP server
///
/// A fresh server is created by `factory` for every MCP session. `extra`
/// carries additional plain HTTP routes (health checks and the like).
pub fn build_router<S, F>(factory: F, mount_path: &str, extra: Router) -> Router
where
    S: rmcp::ServerHandler + Send + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    let service = StreamableHttpService::new(
        move || Ok(factory()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .nest_service(mount_path, service)
        .merge(extra)
        .layer(TraceLayer::new_for_http())
}

/// Serve an MCP server over streamable HTTP until Ctrl-C
///
/// ```rust,ignore
/// let server = MyMcpServer::new();
/// mcp_common::serve_http(move || server.clone(), options, Router::new()).await?;
/// ```
pub async fn serve_http<S, F>(factory: F, options: HttpServeOptions, extra: Router) -> anyhow::Result<()>
where
    S: rmcp::ServerHandler + Send + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    let router = build_router(factory, &options.mount_path, extra);

    let listener = tokio::net::TcpListener::bind(options.bind).await?;
    tracing::info!(
        "MCP endpoint listening on http://{}{}",
        options.bind,
        options.mount_path
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;

    tracing::info!("Server shutting down");
    Ok(())
}
