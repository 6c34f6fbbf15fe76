use serde::{Deserialize, Serialize};

use super::{HostModel, SchemaMetadata, ServiceModel, SwitchModel};
use crate::validation;

/// Errors raised while assembling a whole topology
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error(
        "Hosts 'name' field must be unique in YAML topology, stopping... Repeated names: {}",
        quoted_list(.names)
    )]
    NotUniqueHostNames { names: Vec<String> },

    #[error("Host at position {index} has no 'name' field")]
    UnnamedHost { index: usize },

    #[error(
        "There are switch names in network interfaces: {} which are not detailed \
         described in switches YAML section.",
        quoted_list(.names)
    )]
    UndetailedSwitchNames { names: Vec<String> },

    #[error(
        "Defined switch name: {name} for network interfaces has missing connection details \
         in switches YAML section."
    )]
    MissingSwitchDetails { name: String },

    #[error("Invalid topology YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// `['a', 'b']`
fn quoted_list(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{}'", name)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Raw top-level topology document; every entity is already validated on its own
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopologySpec {
    pub metadata: SchemaMetadata,
    #[serde(default)]
    pub switches: Option<Vec<SwitchModel>>,
    #[serde(default)]
    pub services: Option<Vec<ServiceModel>>,
    #[serde(default)]
    pub hosts: Option<Vec<HostModel>>,
    #[serde(default)]
    pub vms: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub containers: Option<Vec<serde_json::Value>>,
}

impl TopologySpec {
    pub fn new(metadata: SchemaMetadata) -> Self {
        Self {
            metadata,
            switches: None,
            services: None,
            hosts: None,
            vms: None,
            containers: None,
        }
    }
}

/// Validated test-bed topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TopologySpec")]
pub struct TopologyModel {
    metadata: SchemaMetadata,
    switches: Vec<SwitchModel>,
    services: Vec<ServiceModel>,
    hosts: Vec<HostModel>,
    vms: Vec<serde_json::Value>,
    containers: Vec<serde_json::Value>,
}

impl TryFrom<TopologySpec> for TopologyModel {
    type Error = TopologyError;

    fn try_from(spec: TopologySpec) -> Result<Self, Self::Error> {
        let switches = spec.switches.unwrap_or_default();
        let hosts = spec.hosts.unwrap_or_default();

        validation::validate_topology(&hosts, &switches)?;

        Ok(Self {
            metadata: spec.metadata,
            switches,
            services: spec.services.unwrap_or_default(),
            hosts,
            vms: spec.vms.unwrap_or_default(),
            containers: spec.containers.unwrap_or_default(),
        })
    }
}

impl TopologyModel {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self, TopologyError> {
        let spec: TopologySpec = serde_yaml::from_str(content)?;
        Self::try_from(spec)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, TopologyError> {
        let spec: TopologySpec = serde_json::from_str(content)?;
        Self::try_from(spec)
    }

    /// Validate an already parsed document tree
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, TopologyError> {
        let spec: TopologySpec = serde_yaml::from_value(value)?;
        Self::try_from(spec)
    }

    pub fn metadata(&self) -> &SchemaMetadata {
        &self.metadata
    }

    pub fn switches(&self) -> &[SwitchModel] {
        &self.switches
    }

    pub fn services(&self) -> &[ServiceModel] {
        &self.services
    }

    pub fn hosts(&self) -> &[HostModel] {
        &self.hosts
    }

    pub fn vms(&self) -> &[serde_json::Value] {
        &self.vms
    }

    pub fn containers(&self) -> &[serde_json::Value] {
        &self.containers
    }

    /// Switch entry used for `name`; the last declaration wins
    pub fn switch(&self, name: &str) -> Option<&SwitchModel> {
        validation::latest_switches_by_name(&self.switches).get(name).copied()
    }
}
