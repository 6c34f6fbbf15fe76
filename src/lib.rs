//! # testbed-config - Test-bed topology validation and connection resolution
//!
//! This library turns a declarative description of a test bed (hosts,
//! switches, services, network interfaces, connections and power management)
//! into a validated in-memory model, resolves the connections of every host
//! in dependency order and decrypts the secrets carried by test
//! configurations.
//!
//! ## Architecture
//!
//! - `models`: schema models; every entity validates itself while it is deserialized
//! - `identity`: interface identity keys and duplicate detection
//! - `validation`: whole-topology checks (host names, switch references)
//! - `connections`: connection resolution through a pluggable factory
//! - `secrets`: Fernet decryption of the `secrets` section
//! - `power`: power management construction from host models
//! - `switch_info`: switch port discovery for interfaces
//! - `config_loader`: topology and templated test-config loading
//! - `utils`: `--overwrite` parsing, lookup by name, log redaction
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use testbed_config::config_loader;
//!
//! let topology = config_loader::load_topology(Path::new("topology.yaml"))?;
//! for host in topology.hosts() {
//!     println!("{:?}: {} connection(s)", host.name(), host.connections().len());
//! }
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Topology Format
//!
//! ```yaml
//! metadata:
//!   version: '2.5'
//! switches:
//!   - name: Dell 123456
//!     mng_ip_address: 10.1.2.4
//!     switch_type: DellOS9
//!     connection_type: SSHSwitchConnection
//! hosts:
//!   - name: sut
//!     role: sut
//!     network_interfaces:
//!       - pci_device: 8086:1572
//!         interface_index: 0
//!         switch_name: Dell 123456
//!     connections:
//!       - connection_type: RPyCConnection
//!         connection_id: 1
//!         ip_address: 10.0.0.1
//!       - connection_type: SerialConnection
//!         relative_connection_id: 1
//! ```
//!
//! ## Error Handling
//!
//! Domain errors are `thiserror` enums (`ModelError`, `TopologyError`,
//! `ResolveError`, `SecretsError`, ...). File loading returns
//! `color_eyre::Result` with context attached.

pub mod config_loader;
pub mod connections;
pub mod identity;
pub mod models;
pub mod power;
pub mod secrets;
pub mod switch_info;
pub mod utils;
pub mod validation;

pub use connections::{
    Connection, ConnectionFactory, ConnectionResolver, RelativePolicy, ResolveError, TopologyResolveError,
};
pub use models::{ModelError, TopologyError, TopologyModel};
pub use secrets::{get_secrets, SecretModel, SecretsError};
