use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::LazyLock;

use super::ModelError;

/// Connection types reachable without an IP address (console class)
pub const SERIAL_CONNECTION_TYPES: &[&str] = &["SerialConnection"];

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{2}(?:[:-][0-9a-fA-F]{2}){5}$").expect("Invalid mac_address regex")
});

/// Out-of-band controller used to reach hosts identified by MAC address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OsdControllerModel {
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub secured: Option<bool>,
}

impl OsdControllerModel {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            secured: None,
        }
    }
}

/// Raw connection fields as written in the topology document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSpec {
    pub connection_type: String,
    #[serde(default)]
    pub connection_id: Option<u32>,
    #[serde(default)]
    pub relative_connection_id: Option<u32>,
    #[serde(default)]
    pub ip_address: Option<IpAddr>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub osd_details: Option<OsdControllerModel>,
    #[serde(default)]
    pub connection_options: Option<BTreeMap<String, serde_json::Value>>,
}

impl ConnectionSpec {
    pub fn new(connection_type: impl Into<String>) -> Self {
        Self {
            connection_type: connection_type.into(),
            ..Default::default()
        }
    }
}

/// Validated connection specification of a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConnectionSpec")]
pub struct ConnectionModel {
    connection_type: String,
    connection_id: Option<u32>,
    relative_connection_id: Option<u32>,
    ip_address: Option<IpAddr>,
    mac_address: Option<String>,
    osd_details: Option<OsdControllerModel>,
    connection_options: BTreeMap<String, serde_json::Value>,
}

impl TryFrom<ConnectionSpec> for ConnectionModel {
    type Error = ModelError;

    fn try_from(spec: ConnectionSpec) -> Result<Self, Self::Error> {
        if let Some(mac) = &spec.mac_address {
            if !MAC_ADDRESS.is_match(mac) {
                return Err(ModelError::InvalidValue {
                    field: "mac_address",
                    value: mac.clone(),
                    reason: "expected six hex octets separated by ':' or '-'",
                });
            }
        }
        if spec.osd_details.is_some() && spec.mac_address.is_none() {
            return Err(ModelError::MissingCompanion {
                field: "osd_details",
                required: vec!["mac_address"],
            });
        }

        let is_serial = SERIAL_CONNECTION_TYPES.contains(&spec.connection_type.as_str());
        let reachable_by_mac = spec.mac_address.is_some() && spec.osd_details.is_some();
        if spec.ip_address.is_none() && !is_serial && !reachable_by_mac {
            return Err(ModelError::MissingIpAddress {
                connection_type: spec.connection_type,
            });
        }

        Ok(Self {
            connection_type: spec.connection_type,
            connection_id: spec.connection_id,
            relative_connection_id: spec.relative_connection_id,
            ip_address: spec.ip_address,
            mac_address: spec.mac_address,
            osd_details: spec.osd_details,
            connection_options: spec.connection_options.unwrap_or_default(),
        })
    }
}

impl ConnectionModel {
    pub fn connection_type(&self) -> &str {
        &self.connection_type
    }

    pub fn connection_id(&self) -> Option<u32> {
        self.connection_id
    }

    pub fn relative_connection_id(&self) -> Option<u32> {
        self.relative_connection_id
    }

    pub fn ip_address(&self) -> Option<IpAddr> {
        self.ip_address
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.mac_address.as_deref()
    }

    pub fn osd_details(&self) -> Option<&OsdControllerModel> {
        self.osd_details.as_ref()
    }

    /// Options forwarded verbatim to the connection constructor
    pub fn connection_options(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.connection_options
    }

    /// Chained connections are established through another connection
    pub fn is_relative(&self) -> bool {
        self.relative_connection_id.is_some()
    }
}
