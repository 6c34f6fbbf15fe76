//! Whole-topology validation.
//!
//! These checks need every host and switch at once and run only after each
//! entity validated on its own:
//! - host names must be present and unique
//! - every `switch_name` used by an interface must be described in `switches`
//! - the described switch must carry its connection details

use std::collections::{BTreeSet, HashMap};

use crate::models::{HostModel, SwitchModel, TopologyError};

/// Run all cross-entity checks, in order
pub fn validate_topology(hosts: &[HostModel], switches: &[SwitchModel]) -> Result<(), TopologyError> {
    validate_host_names(hosts)?;
    validate_switch_references(hosts, switches)?;

    log::debug!(
        "Topology cross-checks passed for {} host(s) and {} switch(es)",
        hosts.len(),
        switches.len()
    );
    Ok(())
}

/// Every host needs a name and names must not repeat
///
/// Repeated names are reported in the order their second occurrence appears.
pub fn validate_host_names(hosts: &[HostModel]) -> Result<(), TopologyError> {
    let mut seen = BTreeSet::new();
    let mut repeated = Vec::new();

    for (index, host) in hosts.iter().enumerate() {
        let name = host.name().ok_or(TopologyError::UnnamedHost { index })?;
        if !seen.insert(name) && !repeated.iter().any(|r: &String| r == name) {
            repeated.push(name.to_string());
        }
    }

    if repeated.is_empty() {
        Ok(())
    } else {
        Err(TopologyError::NotUniqueHostNames { names: repeated })
    }
}

/// Switch names referenced by interfaces, deduplicated, in first-use order
pub fn referenced_switch_names(hosts: &[HostModel]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for interface in hosts.iter().flat_map(|host| host.network_interfaces()) {
        if let Some(name) = interface.switch_name() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Switches keyed by name; a later declaration overrides an earlier one
pub fn latest_switches_by_name(switches: &[SwitchModel]) -> HashMap<&str, &SwitchModel> {
    switches.iter().fold(HashMap::new(), |mut by_name, switch| {
        by_name.insert(switch.name.as_str(), switch);
        by_name
    })
}

/// Check that interface switch references resolve to usable switch entries
///
/// With no switches described at all, every referenced name is reported
/// together. Otherwise the first name with no entry, or whose (last) entry
/// lacks connection details, is reported on its own.
pub fn validate_switch_references(hosts: &[HostModel], switches: &[SwitchModel]) -> Result<(), TopologyError> {
    let referenced = referenced_switch_names(hosts);
    if referenced.is_empty() {
        return Ok(());
    }

    if switches.is_empty() {
        return Err(TopologyError::UndetailedSwitchNames {
            names: referenced.iter().map(|name| name.to_string()).collect(),
        });
    }

    let by_name = latest_switches_by_name(switches);
    for name in referenced {
        if !by_name.get(name).is_some_and(|switch| switch.has_connection_details()) {
            return Err(TopologyError::MissingSwitchDetails { name: name.to_string() });
        }
    }
    Ok(())
}
