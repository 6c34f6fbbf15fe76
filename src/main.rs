use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::convert::Infallible;
use std::path::PathBuf;

use testbed_config::config_loader;
use testbed_config::models::{get_connected_pairs, ConnectionModel};
use testbed_config::secrets;
use testbed_config::utils::parse_overwrite;
use testbed_config::{Connection, ConnectionFactory, ConnectionResolver, RelativePolicy};

/// Validate test-bed topologies and plan their connections
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology YAML/JSON file
    #[arg(short, long)]
    topology: PathBuf,

    /// Path to the (templated) test configuration YAML file
    #[arg(long)]
    test_config: Option<PathBuf>,

    /// Per-test parameter overrides, e.g. "test_a:k1=v1,k2=v2;test_b:k=v"
    #[arg(long)]
    overwrite: Option<String>,

    /// Print the order in which host connections would be established
    #[arg(long)]
    plan_connections: bool,

    /// Fail when a relative connection's prerequisite is missing
    #[arg(long)]
    strict_relative: bool,
}

/// Connection placeholder produced without touching the network
#[derive(Debug)]
struct PlannedConnection {
    model: ConnectionModel,
    through: Option<u32>,
}

impl Connection for PlannedConnection {
    fn model(&self) -> &ConnectionModel {
        &self.model
    }
}

struct PlanningFactory;

impl ConnectionFactory for PlanningFactory {
    type Connection = PlannedConnection;
    type Error = Infallible;

    fn establish(
        &self,
        model: &ConnectionModel,
        relative: Option<&PlannedConnection>,
    ) -> Result<PlannedConnection, Infallible> {
        Ok(PlannedConnection {
            model: model.clone(),
            through: relative.and_then(|r| r.model().connection_id()),
        })
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Topology file: {:?}", args.topology);
    let topology = config_loader::load_topology(&args.topology)?;

    if let Some(option) = &args.overwrite {
        let overwrites = parse_overwrite(option)?;
        for (test, params) in &overwrites {
            info!("Overwriting parameters of {}: {:?}", test, params);
        }
    }

    if let Some(path) = &args.test_config {
        let test_config = config_loader::load_test_config(path)?;

        let pairs = get_connected_pairs(&test_config)
            .wrap_err_with(|| format!("Invalid 'connections' section in {:?}", path))?;
        for pair in &pairs {
            let arrow = if pair.bidirectional { "<->" } else { "->" };
            info!("Connected hosts: {} {} {}", pair.hosts[0], arrow, pair.hosts[1]);
        }

        match secrets::get_secrets(&test_config) {
            Ok(found) => info!("Decrypted {} secret(s): {:?}", found.len(), found.keys().collect::<Vec<_>>()),
            Err(e) => warn!("Secrets are not available: {}", e),
        }
    }

    if args.plan_connections {
        let policy = if args.strict_relative {
            RelativePolicy::Strict
        } else {
            RelativePolicy::BestEffort
        };
        let factory = PlanningFactory;
        let resolver = ConnectionResolver::new(&factory).with_policy(policy);
        let plan = resolver.resolve_topology(&topology)?;

        for (host, connections) in &plan {
            println!("{}:", host);
            for connection in connections {
                let id = connection
                    .model
                    .connection_id()
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                match connection.through {
                    Some(through) => println!("  [{}] {} via {}", id, connection.model.connection_type(), through),
                    None => println!("  [{}] {}", id, connection.model.connection_type()),
                }
            }
        }
    }

    info!("Topology is valid");
    Ok(())
}
