use crate::config::Config;
use crate::report::OutputFormat;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration file '{}'", config_path.display()))?;

    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", config_path.display()))?;

    config.validate()?;

    Ok(config)
}

/// CLI arguments that override YAML settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub routers: Option<u32>,
    pub hosts_per_router: Option<u32>,
    pub lan_min_hosts: Option<u32>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

/// Apply CLI overrides to a configuration
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) -> Result<()> {
    if let Some(routers) = overrides.routers {
        info!("Overriding router count: {}", routers);
        config.topology.routers = routers;
    }

    if let Some(hosts) = overrides.hosts_per_router {
        info!("Overriding hosts per router: {}", hosts);
        config.topology.hosts_per_router = hosts;
    }

    if let Some(lan_min_hosts) = overrides.lan_min_hosts {
        config.topology.lan_min_hosts = lan_min_hosts;
    }

    if let Some(format) = overrides.format {
        config.general.format = format;
    }

    if let Some(output) = &overrides.output {
        config.general.output = Some(output.clone());
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
