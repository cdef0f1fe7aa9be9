//! refshift dbt integration
//!
//! Parses dbt-generated manifest.json to extract the models and sources that
//! table references resolve against.

pub mod manifest;

pub use manifest::{Manifest, ManifestError, ManifestMetadata, ManifestNode, ManifestSource};
