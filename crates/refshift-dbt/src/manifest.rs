//! dbt manifest.json parsing
//!
//! Parses dbt-generated manifest.json to extract models and sources. Nodes
//! and sources are kept in `BTreeMap`s so manifest iteration order is
//! deterministic across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the manifest
    #[serde(default)]
    pub metadata: ManifestMetadata,

    /// Model and test nodes
    #[serde(default)]
    pub nodes: BTreeMap<String, ManifestNode>,

    /// Source definitions
    #[serde(default)]
    pub sources: BTreeMap<String, ManifestSource>,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse manifest from JSON string
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::ParseError(e.to_string()))
    }

    /// Iterate over model nodes (filters out tests, seeds, etc.)
    pub fn models(&self) -> impl Iterator<Item = (&String, &ManifestNode)> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.resource_type == "model")
    }
}

/// Manifest metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub dbt_schema_version: Option<String>,

    #[serde(default)]
    pub dbt_version: Option<String>,

    #[serde(default)]
    pub project_name: Option<String>,
}

/// A node in the manifest (model, test, snapshot, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Node name (e.g., "users")
    pub name: String,

    /// Resource type (model, test, snapshot, etc.)
    pub resource_type: String,

    /// Alias (output table name)
    #[serde(default)]
    pub alias: Option<String>,
}

/// A source in the manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestSource {
    /// Source name (e.g., "raw")
    pub source_name: String,

    /// Table name (e.g., "users")
    pub name: String,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// Schema name
    #[serde(default)]
    pub schema: Option<String>,
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest file {0}: {1}")]
    IoError(String, String),

    #[error("failed to parse manifest JSON: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_JSON: &str = r#"
    {
        "metadata": {"dbt_version": "1.7.0", "project_name": "jaffle_shop"},
        "nodes": {
            "model.jaffle_shop.fct_orders": {
                "name": "fct_orders",
                "resource_type": "model",
                "alias": "fct_orders"
            },
            "test.jaffle_shop.not_null_fct_orders_id": {
                "name": "not_null_fct_orders_id",
                "resource_type": "test",
                "alias": "not_null_fct_orders_id"
            }
        },
        "sources": {
            "source.jaffle_shop.raw.orders": {
                "source_name": "raw",
                "name": "orders",
                "database": "raw_db",
                "schema": "public"
            }
        }
    }
    "#;

    #[test]
    fn parse_manifest_json() {
        let manifest = Manifest::from_json(MANIFEST_JSON).unwrap();

        assert_eq!(manifest.metadata.dbt_version.as_deref(), Some("1.7.0"));
        assert_eq!(manifest.nodes.len(), 2);
        assert_eq!(manifest.sources.len(), 1);

        let source = &manifest.sources["source.jaffle_shop.raw.orders"];
        assert_eq!(source.source_name, "raw");
        assert_eq!(source.database.as_deref(), Some("raw_db"));
    }

    #[test]
    fn models_filters_out_tests() {
        let manifest = Manifest::from_json(MANIFEST_JSON).unwrap();

        let models: Vec<_> = manifest.models().collect();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].1.name, "fct_orders");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let manifest = Manifest::from_json(
            r#"{"nodes": {}, "sources": {}, "parent_map": {}, "disabled": {}}"#,
        )
        .unwrap();

        assert!(manifest.nodes.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Manifest::from_file(Path::new("does/not/exist/manifest.json"));
        assert!(matches!(result, Err(ManifestError::IoError(_, _))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let result = Manifest::from_json("{not json");
        assert!(matches!(result, Err(ManifestError::ParseError(_))));
    }
}
