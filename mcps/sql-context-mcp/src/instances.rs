//! Instance registry
//!
//! An instance names the set of tables a caller may see. Definitions live in
//! a JSON file and are re-read on every lookup, so edits take effect without a
//! restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RegistryError, ToolError};

/// A named scope over the database's tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    #[serde(rename = "allowedTables", default)]
    pub allowed_tables: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Read-only view over the instances file
#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    path: PathBuf,
}

impl InstanceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every instance definition, in file order
    pub fn load(&self) -> Result<Vec<Instance>, RegistryError> {
        let display = self.path.display().to_string();
        let content = std::fs::read_to_string(&self.path).map_err(|source| RegistryError::Io {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: display,
            source,
        })
    }

    /// Resolve the raw `instance_id` of a request
    ///
    /// The value is trimmed, then compared case-sensitively against each id.
    pub fn resolve(&self, instance_id: Option<&str>) -> Result<Instance, ToolError> {
        let instance_id = instance_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ToolError::MissingParameter)?;

        let instances = self.load()?;
        let available: Vec<String> = instances.iter().map(|i| i.id.clone()).collect();

        match instances.into_iter().find(|i| i.id == instance_id) {
            Some(instance) => {
                tracing::info!(
                    instance_id = %instance.id,
                    tables = instance.allowed_tables.len(),
                    "Resolved instance"
                );
                Ok(instance)
            }
            None => Err(ToolError::NotFound {
                instance_id: instance_id.to_string(),
                available,
            }),
        }
    }
}
