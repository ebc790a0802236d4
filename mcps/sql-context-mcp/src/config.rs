//! Configuration for SQL Context MCP Server

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// SQL Context MCP configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqlContextConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where instance definitions are read from
    #[serde(default)]
    pub instances: InstancesConfig,

    /// Chat model used to draft SQL
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    /// Default: 0.0.0.0:8000
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Path the MCP endpoint is mounted under
    /// Default: /llm
    #[serde(default = "default_mount_path")]
    pub mount_path: String,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Busy timeout applied to the connection, in seconds
    /// Default: 30
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Attempts made to (re)establish the connection before giving up
    /// Default: 3
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,

    /// Base delay between connection attempts; attempt `n` waits `n` times this
    /// Default: 200
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Instance registry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InstancesConfig {
    /// JSON file listing `{ "id", "allowedTables" }` records
    #[serde(default = "default_instances_path")]
    pub path: PathBuf,
}

/// Chat model configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model name sent with every completion request
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_mount_path() -> String {
    "/llm".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("database.db")
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_instances_path() -> PathBuf {
    PathBuf::from("mcp_instances.json")
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            mount_path: default_mount_path(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            timeout_secs: default_timeout(),
            connect_attempts: default_connect_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            path: default_instances_path(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl SqlContextConfig {
    /// Load configuration
    ///
    /// An explicit path (from `--config` or `SQL_CONTEXT_CONFIG_PATH`) must
    /// exist and parse. Otherwise looks for config in:
    /// 1. `~/.binks/sql-context.toml`
    /// 2. `./sql-context-mcp.toml`
    ///
    /// and falls back to defaults when none is usable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let mut candidates = Vec::new();
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".binks").join("sql-context.toml"));
        }
        candidates.push(PathBuf::from("sql-context-mcp.toml"));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => tracing::warn!("Skipping config {}: {:#}", path.display(), e),
            }
        }

        tracing::info!("Using default configuration");
        Ok(Self::default())
    }

    /// Read and parse a single TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Read the model API key from the configured environment variable
    ///
    /// Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
