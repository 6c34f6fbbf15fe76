//! Host (system under test) models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

use super::{ConnectionModel, ModelError, NetworkInterfaceModel, PowerMngModel};
use crate::identity;

/// Hardware class of a host
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MachineType {
    #[default]
    Regular,
    Ipu,
}

/// Secondary classification required for IPU machines
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IpuHostType {
    /// Integrated management complex
    Imc,
    /// Accelerator compute complex
    Acc,
    /// Xeon host complex
    Xhc,
}

/// Value of a free-form extra info entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraInfoValue {
    Text(String),
    List(Vec<String>),
}

/// Free-form host annotations; only strings and string lists are accepted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraInfoModel {
    entries: BTreeMap<String, ExtraInfoValue>,
}

impl ExtraInfoModel {
    pub fn get(&self, key: &str) -> Option<&ExtraInfoValue> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            ExtraInfoValue::Text(text) => Some(text),
            ExtraInfoValue::List(_) => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.entries.get(key)? {
            ExtraInfoValue::List(values) => Some(values),
            ExtraInfoValue::Text(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ExtraInfoValue)> {
        self.entries.iter()
    }
}

fn default_instantiate() -> bool {
    true
}

/// Raw host fields as written in the topology document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mng_ip_address: Option<IpAddr>,
    #[serde(default = "default_instantiate")]
    pub instantiate: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub machine_type: MachineType,
    #[serde(default)]
    pub ipu_host_type: Option<IpuHostType>,
    #[serde(default)]
    pub network_interfaces: Option<Vec<NetworkInterfaceModel>>,
    #[serde(default)]
    pub connections: Option<Vec<ConnectionModel>>,
    #[serde(default)]
    pub power_mng: Option<PowerMngModel>,
    #[serde(default)]
    pub extra_info: Option<ExtraInfoModel>,
}

impl Default for HostSpec {
    fn default() -> Self {
        Self {
            name: None,
            mng_ip_address: None,
            instantiate: true,
            role: None,
            machine_type: MachineType::Regular,
            ipu_host_type: None,
            network_interfaces: None,
            connections: None,
            power_mng: None,
            extra_info: None,
        }
    }
}

type HostCheck = fn(&HostSpec) -> Result<(), ModelError>;

const HOST_CHECKS: &[HostCheck] = &[check_ipu_host_type, check_unique_interfaces];

fn check_ipu_host_type(spec: &HostSpec) -> Result<(), ModelError> {
    if spec.machine_type == MachineType::Ipu && spec.ipu_host_type.is_none() {
        return Err(ModelError::MissingIpuHostType);
    }
    Ok(())
}

fn check_unique_interfaces(spec: &HostSpec) -> Result<(), ModelError> {
    let interfaces = spec.network_interfaces.as_deref().unwrap_or_default();
    match identity::find_conflict(interfaces) {
        Some((first, second)) => Err(ModelError::ConflictingInterfaces {
            first: interfaces[first].to_string(),
            second: interfaces[second].to_string(),
        }),
        None => Ok(()),
    }
}

/// Order connections so that every relative connection comes after the
/// connections it may depend on: id-bearing ones ascending, then the rest
/// in declaration order.
fn sort_connections(connections: &mut [ConnectionModel]) {
    connections.sort_by_key(|connection| match connection.connection_id() {
        Some(id) => (0, id),
        None => (1, 0),
    });
}

/// Validated host of a topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HostSpec")]
pub struct HostModel {
    name: Option<String>,
    mng_ip_address: Option<IpAddr>,
    instantiate: bool,
    role: Option<String>,
    machine_type: MachineType,
    ipu_host_type: Option<IpuHostType>,
    network_interfaces: Vec<NetworkInterfaceModel>,
    connections: Vec<ConnectionModel>,
    power_mng: Option<PowerMngModel>,
    extra_info: Option<ExtraInfoModel>,
}

/// Hosts are described by the same model whatever their role
pub type SutModel = HostModel;

impl TryFrom<HostSpec> for HostModel {
    type Error = ModelError;

    fn try_from(spec: HostSpec) -> Result<Self, Self::Error> {
        for check in HOST_CHECKS {
            check(&spec)?;
        }

        let mut connections = spec.connections.unwrap_or_default();
        sort_connections(&mut connections);

        Ok(Self {
            name: spec.name,
            mng_ip_address: spec.mng_ip_address,
            instantiate: spec.instantiate,
            role: spec.role,
            machine_type: spec.machine_type,
            ipu_host_type: spec.ipu_host_type,
            network_interfaces: spec.network_interfaces.unwrap_or_default(),
            connections,
            power_mng: spec.power_mng,
            extra_info: spec.extra_info,
        })
    }
}

impl HostModel {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn mng_ip_address(&self) -> Option<IpAddr> {
        self.mng_ip_address
    }

    pub fn instantiate(&self) -> bool {
        self.instantiate
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn machine_type(&self) -> MachineType {
        self.machine_type
    }

    pub fn ipu_host_type(&self) -> Option<IpuHostType> {
        self.ipu_host_type
    }

    pub fn network_interfaces(&self) -> &[NetworkInterfaceModel] {
        &self.network_interfaces
    }

    /// Connections in resolution order
    pub fn connections(&self) -> &[ConnectionModel] {
        &self.connections
    }

    pub fn power_mng(&self) -> Option<&PowerMngModel> {
        self.power_mng.as_ref()
    }

    pub fn extra_info(&self) -> Option<&ExtraInfoModel> {
        self.extra_info.as_ref()
    }
}
