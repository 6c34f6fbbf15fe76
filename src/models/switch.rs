use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Supported switch management flavours
///
/// Extending support means adding a variant here; validation is done by serde.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchType {
    Arista,
    Cisco,
    #[serde(rename = "Cisco_NXOS")]
    CiscoNxos,
    Dell,
    DellOS9,
    #[serde(rename = "DellOS9_7000")]
    DellOS9Series7000,
    #[serde(rename = "DellOS9_8132")]
    DellOS9Series8132,
    DellOS10,
    Extreme,
    Juniper,
    Mellanox,
    Mellanox25G,
    MellanoxOnyx,
}

fn default_instantiate() -> bool {
    true
}

/// Switch entry of the topology `switches` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchModel {
    pub name: String,
    #[serde(default)]
    pub mng_ip_address: Option<IpAddr>,
    #[serde(default)]
    pub mng_user: Option<String>,
    #[serde(default)]
    pub mng_password: Option<String>,
    #[serde(default = "default_instantiate")]
    pub instantiate: bool,
    pub switch_type: SwitchType,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub ssh_key_file: Option<String>,
    #[serde(default)]
    pub use_ssh_key: Option<bool>,
    #[serde(default)]
    pub enable_password: Option<String>,
    #[serde(default)]
    pub auth_timeout: Option<u32>,
    #[serde(default)]
    pub switch_ports: Option<Vec<String>>,
    #[serde(default)]
    pub vlans: Option<Vec<String>>,
}

impl SwitchModel {
    /// Minimal switch with only the fields needed to connect to it
    pub fn new(
        name: impl Into<String>,
        mng_ip_address: IpAddr,
        switch_type: SwitchType,
        connection_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mng_ip_address: Some(mng_ip_address),
            mng_user: None,
            mng_password: None,
            instantiate: true,
            switch_type,
            device_type: None,
            connection_type: Some(connection_type.into()),
            ssh_key_file: None,
            use_ssh_key: None,
            enable_password: None,
            auth_timeout: None,
            switch_ports: None,
            vlans: None,
        }
    }

    /// A switch can be connected to only with a management address and a connection type
    pub fn has_connection_details(&self) -> bool {
        self.mng_ip_address.is_some()
            && self
                .connection_type
                .as_deref()
                .is_some_and(|connection_type| !connection_type.is_empty())
    }
}
