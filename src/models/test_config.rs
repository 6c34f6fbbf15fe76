//! Models of the test configuration file (as opposed to the topology).

use serde::{Deserialize, Serialize};

/// Pair of hosts the test expects to be connected with each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostPairConnectionModel {
    pub bidirectional: bool,
    pub hosts: [String; 2],
}

/// Read the `connections` list of a test config; absent key yields no pairs
pub fn get_connected_pairs(test_config: &serde_yaml::Value) -> Result<Vec<HostPairConnectionModel>, serde_yaml::Error> {
    match test_config.get("connections") {
        Some(connections) => serde_yaml::from_value(connections.clone()),
        None => Ok(Vec::new()),
    }
}
