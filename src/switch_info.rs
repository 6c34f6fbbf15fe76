//! Switch port discovery for interfaces attached to a named switch.

use crate::models::NetworkInterfaceModel;

/// Live switch connection able to look up ports
pub trait SwitchHandle {
    type Error: std::error::Error;

    /// Name of the topology entry this switch was built from
    fn name(&self) -> &str;

    fn get_port_by_mac(&self, mac: &str) -> Result<String, Self::Error>;
}

/// Switch and port an interface is plugged into
#[derive(Debug)]
pub struct SwitchInfo<'a, S> {
    pub switch: &'a S,
    pub port: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwitchLookupError {
    #[error("There is no info about switches in topology config so we cannot update SwitchInfo.")]
    NoSwitches,

    #[error("Cannot detect switch port on any of the switches for {interface}.")]
    PortNotDetected { interface: String },
}

/// Find the switch port of an interface.
///
/// Interfaces without `switch_name` are skipped. A declared `switch_port`
/// is taken as is; otherwise every switch with the matching name is asked
/// for the port of `mac` until one answers.
pub fn locate_switch_port<'a, S: SwitchHandle>(
    interface: &NetworkInterfaceModel,
    mac: &str,
    switches: &'a [S],
) -> Result<Option<SwitchInfo<'a, S>>, SwitchLookupError> {
    if switches.is_empty() {
        return Err(SwitchLookupError::NoSwitches);
    }
    let Some(switch_name) = interface.switch_name() else {
        return Ok(None);
    };

    for switch in switches.iter().filter(|switch| switch.name() == switch_name) {
        if let Some(port) = interface.switch_port() {
            return Ok(Some(SwitchInfo {
                switch,
                port: port.to_string(),
            }));
        }
        match switch.get_port_by_mac(mac) {
            Ok(port) => {
                log::debug!("Found port {} for {} on {} switch", port, interface, switch_name);
                return Ok(Some(SwitchInfo { switch, port }));
            }
            Err(e) => {
                log::debug!("Switch {} has no port for {}: {}", switch_name, mac, e);
            }
        }
    }

    Err(SwitchLookupError::PortNotDetected {
        interface: interface.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NetworkInterfaceSpec;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    #[error("port not found")]
    struct NotFound;

    #[derive(Debug)]
    struct FakeSwitch {
        name: &'static str,
        ports: HashMap<&'static str, &'static str>,
    }

    impl SwitchHandle for FakeSwitch {
        type Error = NotFound;

        fn name(&self) -> &str {
            self.name
        }

        fn get_port_by_mac(&self, mac: &str) -> Result<String, NotFound> {
            self.ports.get(mac).map(|port| port.to_string()).ok_or(NotFound)
        }
    }

    fn interface(switch_name: Option<&str>, switch_port: Option<&str>) -> NetworkInterfaceModel {
        NetworkInterfaceModel::try_from(NetworkInterfaceSpec {
            interface_name: Some("eth2".to_string()),
            switch_name: switch_name.map(str::to_string),
            switch_port: switch_port.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    fn switches() -> Vec<FakeSwitch> {
        vec![
            FakeSwitch { name: "Dell", ports: HashMap::new() },
            FakeSwitch { name: "Dell", ports: HashMap::from([("aa:bb:cc:dd:ee:ff", "Eth1/7")]) },
            FakeSwitch { name: "Mellanox", ports: HashMap::from([("aa:bb:cc:dd:ee:ff", "Eth1/9")]) },
        ]
    }

    #[test]
    fn test_port_from_topology() {
        let switches = switches();
        let info = locate_switch_port(&interface(Some("Dell"), Some("Eth1/1")), "aa:bb:cc:dd:ee:ff", &switches)
            .unwrap()
            .unwrap();
        assert_eq!(info.port, "Eth1/1");
    }

    #[test]
    fn test_port_lookup_continues_after_not_found() {
        let switches = switches();
        let info = locate_switch_port(&interface(Some("Dell"), None), "aa:bb:cc:dd:ee:ff", &switches)
            .unwrap()
            .unwrap();
        assert_eq!(info.port, "Eth1/7");
        assert_eq!(info.switch.name(), "Dell");
    }

    #[test]
    fn test_port_not_detected() {
        let switches = switches();
        let err = locate_switch_port(&interface(Some("Dell"), None), "11:22:33:44:55:66", &switches).unwrap_err();
        assert!(matches!(err, SwitchLookupError::PortNotDetected { .. }));
    }

    #[test]
    fn test_interface_without_switch() {
        let switches = switches();
        assert!(locate_switch_port(&interface(None, None), "aa:bb:cc:dd:ee:ff", &switches).unwrap().is_none());
    }

    #[test]
    fn test_no_switches() {
        let none: Vec<FakeSwitch> = Vec::new();
        assert_eq!(
            locate_switch_port(&interface(Some("Dell"), None), "aa:bb:cc:dd:ee:ff", &none).unwrap_err(),
            SwitchLookupError::NoSwitches
        );
    }
}
