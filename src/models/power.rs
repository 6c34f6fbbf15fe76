use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Supported power distribution units
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerMngType {
    Raritan,
    #[serde(rename = "APC")]
    Apc,
    #[serde(rename = "IPMI")]
    Ipmi,
}

impl PowerMngType {
    /// UDP port used when the topology does not specify one
    pub fn default_udp_port(self) -> u16 {
        match self {
            PowerMngType::Raritan | PowerMngType::Apc => 161,
            PowerMngType::Ipmi => 623,
        }
    }
}

/// Power management entry of a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerMngModel {
    pub power_mng_type: PowerMngType,
    pub ip: IpAddr,
    #[serde(default)]
    pub community_string: Option<String>,
    #[serde(default)]
    pub udp_port: Option<u16>,
}

impl PowerMngModel {
    pub fn new(power_mng_type: PowerMngType, ip: IpAddr) -> Self {
        Self {
            power_mng_type,
            ip,
            community_string: None,
            udp_port: None,
        }
    }
}
