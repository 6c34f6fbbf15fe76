use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Kinds of auxiliary services a test bed may expose
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Vcsa,
    Nsx,
    Dhcp,
}

/// Entry of the topology `services` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceModel {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    #[serde(default)]
    pub label: Option<String>,
}

impl ServiceModel {
    pub fn new(service_type: ServiceType) -> Self {
        Self {
            service_type,
            username: None,
            password: None,
            ip_address: None,
            label: None,
        }
    }
}
