use crate::models::TopologyModel;
use crate::utils::redact;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::Path;

/// Load and parse a YAML (or JSON) document
pub fn load_config(config_path: &Path) -> Result<serde_yaml::Value> {
    info!("Loading configuration from: {:?}", config_path);

    let content = std::fs::read_to_string(config_path)
        .wrap_err_with(|| format!("Failed to read configuration file {:?}", config_path))?;
    let config: serde_yaml::Value = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse configuration file {:?}", config_path))?;

    log_config(&file_name(config_path), &config);
    Ok(config)
}

/// Load a topology document and validate it
pub fn load_topology(topology_path: &Path) -> Result<TopologyModel> {
    let config = load_config(topology_path)?;
    let topology = TopologyModel::from_value(config)
        .wrap_err_with(|| format!("Invalid topology in {:?}", topology_path))?;

    info!(
        "Topology loaded: {} host(s), {} switch(es), {} service(s)",
        topology.hosts().len(),
        topology.switches().len(),
        topology.services().len()
    );
    Ok(topology)
}

/// Render a test configuration template and parse the result
///
/// The template sees the process environment as `env`, e.g. `{{ env.HOME }}`.
pub fn load_test_config(test_config_path: &Path) -> Result<serde_yaml::Value> {
    info!("Loading test configuration from: {:?}", test_config_path);

    let template = std::fs::read_to_string(test_config_path)
        .wrap_err_with(|| format!("Failed to read test configuration file {:?}", test_config_path))?;
    let vars: BTreeMap<String, String> = std::env::vars().collect();
    let rendered = render_test_config(&template, &vars)
        .wrap_err_with(|| format!("Failed to render test configuration template {:?}", test_config_path))?;

    let config: serde_yaml::Value = serde_yaml::from_str(&rendered)
        .wrap_err_with(|| format!("Failed to parse test configuration file {:?}", test_config_path))?;

    log_config(&file_name(test_config_path), &config);
    Ok(config)
}

fn render_test_config(template: &str, vars: &BTreeMap<String, String>) -> Result<String, minijinja::Error> {
    let env = minijinja::Environment::new();
    env.render_str(template, minijinja::context! { env => vars })
}

/// Log a configuration document with secrets and passwords redacted
pub fn log_config(name: &str, config: &serde_yaml::Value) {
    match serde_yaml::to_string(config) {
        Ok(yaml) => debug!("{}:\n{}", name, redact(&yaml)),
        Err(e) => warn!("Cannot serialize {} for logging: {}", name, e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
