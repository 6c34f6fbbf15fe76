//! Interface identity resolution.
//!
//! Two declarations on the same host conflict when they use the same
//! identification scheme with the same discriminator and their index sets
//! overlap. Interfaces without indexes on both sides conflict as soon as
//! their keys match, since they denote the same unindexed interface.

use std::collections::BTreeSet;

use crate::models::NetworkInterfaceModel;

/// Identification scheme plus discriminator of an interface declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityKey {
    PciAddress(String),
    PciDevice(String),
    InterfaceName(String),
    SpeedFamily {
        speed: Option<String>,
        family: Option<String>,
    },
}

/// Identity key of an interface.
///
/// `None` for interfaces with `random_interface` set, whatever their other
/// fields: each one picks its own port, so they never conflict with anything.
/// PCI identifiers are compared case-insensitively.
pub fn identity_key(interface: &NetworkInterfaceModel) -> Option<IdentityKey> {
    if interface.random_interface() {
        return None;
    }
    if let Some(address) = interface.pci_address() {
        return Some(IdentityKey::PciAddress(address.to_ascii_lowercase()));
    }
    if let Some(device) = interface.pci_device() {
        return Some(IdentityKey::PciDevice(device.to_ascii_lowercase()));
    }
    if let Some(name) = interface.interface_name() {
        return Some(IdentityKey::InterfaceName(name.to_string()));
    }
    if interface.speed().is_some() || interface.family().is_some() {
        return Some(IdentityKey::SpeedFamily {
            speed: interface.speed().map(str::to_string),
            family: interface.family().map(str::to_string),
        });
    }
    None
}

/// Index values of an interface; a single index is a one-element set
pub fn index_set(interface: &NetworkInterfaceModel) -> BTreeSet<&str> {
    match (interface.interface_index(), interface.interface_indexes()) {
        (Some(index), _) => BTreeSet::from([index]),
        (None, Some(indexes)) => indexes.iter().map(String::as_str).collect(),
        (None, None) => BTreeSet::new(),
    }
}

/// Whether two declarations denote (at least partly) the same interface
pub fn conflicts(a: &NetworkInterfaceModel, b: &NetworkInterfaceModel) -> bool {
    let (Some(key_a), Some(key_b)) = (identity_key(a), identity_key(b)) else {
        return false;
    };
    if key_a != key_b {
        return false;
    }

    let (indexes_a, indexes_b) = (index_set(a), index_set(b));
    if indexes_a.is_empty() && indexes_b.is_empty() {
        return true;
    }
    !indexes_a.is_disjoint(&indexes_b)
}

/// Positions of the first conflicting pair in declaration order, if any
pub fn find_conflict(interfaces: &[NetworkInterfaceModel]) -> Option<(usize, usize)> {
    for (i, first) in interfaces.iter().enumerate() {
        for (j, second) in interfaces.iter().enumerate().skip(i + 1) {
            if conflicts(first, second) {
                return Some((i, j));
            }
        }
    }
    None
}
