//! Power management construction from topology models.

use std::net::IpAddr;

use crate::models::{PowerMngModel, PowerMngType};

/// Fully resolved PDU parameters handed to the constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSettings {
    pub power_mng_type: PowerMngType,
    pub ip: IpAddr,
    pub community_string: Option<String>,
    pub udp_port: u16,
}

impl PduSettings {
    /// Fill in the type-specific default port when the model has none
    pub fn from_model(model: &PowerMngModel) -> Self {
        Self {
            power_mng_type: model.power_mng_type,
            ip: model.ip,
            community_string: model.community_string.clone(),
            udp_port: model
                .udp_port
                .unwrap_or_else(|| model.power_mng_type.default_udp_port()),
        }
    }
}

/// Constructor of live power management objects
pub trait PowerManagementBuilder {
    type Pdu;
    type Error: std::error::Error;

    fn build(&self, settings: PduSettings) -> Result<Self::Pdu, Self::Error>;
}

/// Build the power management object described by a host's `power_mng` entry
pub fn create_power_mng_from_model<B: PowerManagementBuilder>(
    model: &PowerMngModel,
    builder: &B,
) -> Result<B::Pdu, B::Error> {
    let settings = PduSettings::from_model(model);
    log::debug!(
        "Creating {:?} power management for {} on UDP port {}",
        settings.power_mng_type,
        settings.ip,
        settings.udp_port
    );
    builder.build(settings)
}
