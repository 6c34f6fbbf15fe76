use serde::{Deserialize, Serialize};

use super::ModelError;

/// Topology schema versions this crate understands
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["2.0", "2.1", "2.2", "2.3", "2.4", "2.5"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataSpec {
    version: String,
}

/// Document metadata, currently only the schema version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MetadataSpec")]
pub struct SchemaMetadata {
    version: String,
}

impl SchemaMetadata {
    pub fn new(version: impl Into<String>) -> Result<Self, ModelError> {
        let version = version.into();
        Self::version_must_fit(&version)?;
        Ok(Self { version })
    }

    /// Check a version string against the supported allow-list
    pub fn version_must_fit(version: &str) -> Result<(), ModelError> {
        if SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
            Ok(())
        } else {
            Err(ModelError::WrongSchemaVersion {
                version: version.to_string(),
                supported: SUPPORTED_SCHEMA_VERSIONS,
            })
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl TryFrom<MetadataSpec> for SchemaMetadata {
    type Error = ModelError;

    fn try_from(spec: MetadataSpec) -> Result<Self, Self::Error> {
        Self::new(spec.version)
    }
}
