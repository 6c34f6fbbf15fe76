//! Network interface declarations.
//!
//! An interface must be identifiable on its host through exactly one scheme:
//! PCI address, PCI device id plus index, interface name, speed/family plus
//! index, or the `random_interface` flag.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::LazyLock;

use super::ModelError;

/// `[domain:]bus:device.function`, e.g. `18:00.1` or `0000:18:00.1`
static PCI_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9a-fA-F]{4}:)?[0-9a-fA-F]{2}:[0-9a-fA-F]{2}\.[0-7]$")
        .expect("Invalid pci_address regex")
});

/// `vendor:device` or `vendor:device:subvendor:subdevice`
static PCI_DEVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{4}:[0-9a-fA-F]{4}(?::[0-9a-fA-F]{4}:[0-9a-fA-F]{4})?$")
        .expect("Invalid pci_device regex")
});

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(i64),
    Text(String),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Number(number) => number.to_string(),
            Scalar::Text(text) => text,
        }
    }
}

/// Indexes and VLANs are written both as numbers and strings in topology files
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn scalar_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Scalar>>::deserialize(deserializer)?
        .map(|values| values.into_iter().map(String::from).collect()))
}

/// IP address assigned to an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpModel {
    pub value: IpAddr,
    #[serde(default)]
    pub mask: Option<u8>,
}

/// Raw interface fields as written in the topology document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkInterfaceSpec {
    #[serde(default)]
    pub pci_address: Option<String>,
    #[serde(default)]
    pub pci_device: Option<String>,
    #[serde(default)]
    pub interface_name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub interface_index: Option<String>,
    #[serde(default, deserialize_with = "scalar_strings")]
    pub interface_indexes: Option<Vec<String>>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub random_interface: Option<bool>,
    #[serde(default)]
    pub ips: Option<Vec<IpModel>>,
    #[serde(default)]
    pub switch_name: Option<String>,
    #[serde(default)]
    pub switch_port: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub vlan: Option<String>,
}

impl NetworkInterfaceSpec {
    fn has_index(&self) -> bool {
        self.interface_index.is_some() || self.interface_indexes.is_some()
    }

    fn is_random(&self) -> bool {
        self.random_interface.unwrap_or(false)
    }
}

type InterfaceCheck = fn(&NetworkInterfaceSpec) -> Result<(), ModelError>;

/// Per-interface checks, run in order; the first failure wins
const INTERFACE_CHECKS: &[InterfaceCheck] = &[
    check_pci_address,
    check_pci_device,
    check_interface_name,
    check_index_fields,
    check_speed_family,
    check_has_id,
    check_switch_port,
];

fn check_pci_address(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    let Some(address) = &spec.pci_address else {
        return Ok(());
    };
    if !PCI_ADDRESS.is_match(address) {
        return Err(ModelError::InvalidValue {
            field: "pci_address",
            value: address.clone(),
            reason: "expected [dddd:]bb:dd.f format",
        });
    }

    let mut fields = vec!["pci_address"];
    let others = [
        ("pci_device", spec.pci_device.is_some()),
        ("interface_name", spec.interface_name.is_some()),
        ("interface_index", spec.interface_index.is_some()),
        ("interface_indexes", spec.interface_indexes.is_some()),
        ("speed", spec.speed.is_some()),
        ("family", spec.family.is_some()),
    ];
    fields.extend(others.iter().filter(|(_, set)| *set).map(|(name, _)| *name));
    if fields.len() > 1 {
        return Err(ModelError::ConflictingFields { fields });
    }
    Ok(())
}

fn check_pci_device(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    let Some(device) = &spec.pci_device else {
        return Ok(());
    };
    if !PCI_DEVICE.is_match(device) {
        return Err(ModelError::InvalidValue {
            field: "pci_device",
            value: device.clone(),
            reason: "expected vvvv:dddd or vvvv:dddd:ssss:ssss hex format",
        });
    }
    if !spec.has_index() && !spec.is_random() {
        return Err(ModelError::MissingCompanion {
            field: "pci_device",
            required: vec!["interface_index", "interface_indexes", "random_interface"],
        });
    }
    Ok(())
}

fn check_interface_name(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    if spec.interface_name.is_some() && (spec.pci_address.is_some() || spec.pci_device.is_some()) {
        let mut fields = vec!["interface_name"];
        if spec.pci_address.is_some() {
            fields.push("pci_address");
        }
        if spec.pci_device.is_some() {
            fields.push("pci_device");
        }
        return Err(ModelError::ConflictingFields { fields });
    }
    Ok(())
}

fn check_index_fields(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    if spec.interface_index.is_some() && spec.interface_indexes.is_some() {
        return Err(ModelError::ConflictingFields {
            fields: vec!["interface_index", "interface_indexes"],
        });
    }
    if spec.interface_indexes.as_ref().is_some_and(Vec::is_empty) {
        return Err(ModelError::InvalidValue {
            field: "interface_indexes",
            value: "[]".to_string(),
            reason: "at least one index is required",
        });
    }
    Ok(())
}

fn check_speed_family(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    if (spec.speed.is_some() || spec.family.is_some()) && !spec.has_index() && !spec.is_random() {
        let field = if spec.speed.is_some() { "speed" } else { "family" };
        return Err(ModelError::MissingCompanion {
            field,
            required: vec!["interface_index", "interface_indexes", "random_interface"],
        });
    }
    Ok(())
}

fn check_has_id(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    let identified = spec.pci_address.is_some()
        || spec.pci_device.is_some()
        || spec.interface_name.is_some()
        || spec.speed.is_some()
        || spec.family.is_some()
        || spec.is_random();
    if identified {
        Ok(())
    } else {
        Err(ModelError::NoInterfaceId)
    }
}

fn check_switch_port(spec: &NetworkInterfaceSpec) -> Result<(), ModelError> {
    match (&spec.switch_port, &spec.switch_name) {
        (Some(port), None) => Err(ModelError::SwitchPortWithoutName { port: port.clone() }),
        _ => Ok(()),
    }
}

/// Validated network interface of a host
///
/// Derived equality is strict field equality; duplicate detection uses
/// [`crate::identity::conflicts`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NetworkInterfaceSpec")]
pub struct NetworkInterfaceModel {
    pci_address: Option<String>,
    pci_device: Option<String>,
    interface_name: Option<String>,
    interface_index: Option<String>,
    interface_indexes: Option<Vec<String>>,
    speed: Option<String>,
    family: Option<String>,
    random_interface: bool,
    ips: Vec<IpModel>,
    switch_name: Option<String>,
    switch_port: Option<String>,
    vlan: Option<String>,
}

impl TryFrom<NetworkInterfaceSpec> for NetworkInterfaceModel {
    type Error = ModelError;

    fn try_from(spec: NetworkInterfaceSpec) -> Result<Self, Self::Error> {
        for check in INTERFACE_CHECKS {
            check(&spec)?;
        }

        Ok(Self {
            random_interface: spec.is_random(),
            pci_address: spec.pci_address,
            pci_device: spec.pci_device,
            interface_name: spec.interface_name,
            interface_index: spec.interface_index,
            interface_indexes: spec.interface_indexes,
            speed: spec.speed,
            family: spec.family,
            ips: spec.ips.unwrap_or_default(),
            switch_name: spec.switch_name,
            switch_port: spec.switch_port,
            vlan: spec.vlan,
        })
    }
}

impl NetworkInterfaceModel {
    pub fn pci_address(&self) -> Option<&str> {
        self.pci_address.as_deref()
    }

    pub fn pci_device(&self) -> Option<&str> {
        self.pci_device.as_deref()
    }

    pub fn interface_name(&self) -> Option<&str> {
        self.interface_name.as_deref()
    }

    pub fn interface_index(&self) -> Option<&str> {
        self.interface_index.as_deref()
    }

    pub fn interface_indexes(&self) -> Option<&[String]> {
        self.interface_indexes.as_deref()
    }

    pub fn speed(&self) -> Option<&str> {
        self.speed.as_deref()
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn random_interface(&self) -> bool {
        self.random_interface
    }

    pub fn ips(&self) -> &[IpModel] {
        &self.ips
    }

    pub fn switch_name(&self) -> Option<&str> {
        self.switch_name.as_deref()
    }

    pub fn switch_port(&self) -> Option<&str> {
        self.switch_port.as_deref()
    }

    pub fn vlan(&self) -> Option<&str> {
        self.vlan.as_deref()
    }
}

impl fmt::Display for NetworkInterfaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let named = [
            ("pci_address", &self.pci_address),
            ("pci_device", &self.pci_device),
            ("interface_name", &self.interface_name),
            ("speed", &self.speed),
            ("family", &self.family),
            ("interface_index", &self.interface_index),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                parts.push(format!("{}={}", name, value));
            }
        }
        if let Some(indexes) = &self.interface_indexes {
            parts.push(format!("interface_indexes=[{}]", indexes.join(", ")));
        }
        if self.random_interface {
            parts.push("random_interface=true".to_string());
        }
        write!(f, "NetworkInterface({})", parts.join(", "))
    }
}
