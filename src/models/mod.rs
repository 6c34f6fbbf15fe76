//! Typed, validated topology models.
//!
//! Every entity is deserialized from a raw `*Spec` form and validated in
//! `TryFrom`, so a model value only exists once its own invariants hold.
//! Cross-entity rules (unique host names, switch references) run afterwards
//! in [`crate::validation`] when a [`TopologyModel`] is assembled.

pub mod connection;
pub mod host;
pub mod interface;
pub mod metadata;
pub mod power;
pub mod service;
pub mod switch;
pub mod test_config;
pub mod topology;

pub use connection::{ConnectionModel, ConnectionSpec, OsdControllerModel};
pub use host::{ExtraInfoModel, ExtraInfoValue, HostModel, HostSpec, IpuHostType, MachineType, SutModel};
pub use interface::{IpModel, NetworkInterfaceModel, NetworkInterfaceSpec};
pub use metadata::{SchemaMetadata, SUPPORTED_SCHEMA_VERSIONS};
pub use power::{PowerMngModel, PowerMngType};
pub use service::{ServiceModel, ServiceType};
pub use switch::{SwitchModel, SwitchType};
pub use test_config::{get_connected_pairs, HostPairConnectionModel};
pub use topology::{TopologyError, TopologyModel, TopologySpec};

/// Field-scoped validation errors raised while building a single entity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Wrong schema version: {version}, supported versions: {supported:?}")]
    WrongSchemaVersion {
        version: String,
        supported: &'static [&'static str],
    },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Fields {fields:?} cannot be used together")]
    ConflictingFields { fields: Vec<&'static str> },

    #[error("Field '{field}' requires one of {required:?}")]
    MissingCompanion {
        field: &'static str,
        required: Vec<&'static str>,
    },

    #[error("Switch_port: {port} provided without switch_name.")]
    SwitchPortWithoutName { port: String },

    #[error(
        "Network interface has no id, provide one of: pci_address, pci_device, \
         interface_name, speed/family or random_interface"
    )]
    NoInterfaceId,

    #[error("IPU host type is required for IPU machine type.")]
    MissingIpuHostType,

    #[error(
        "ip_address is required for {connection_type} unless both mac_address \
         and osd_details are provided"
    )]
    MissingIpAddress { connection_type: String },

    #[error("Network interfaces must be unique per host, conflicting: {first} and {second}")]
    ConflictingInterfaces { first: String, second: String },
}
