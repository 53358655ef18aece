use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use autonet::config::Config;
use autonet::config_loader::{self, CliOverrides};
use autonet::report::{self, OutputFormat};
use autonet::topology::plan_topology;

/// Addressing plan generator for simulated NAT multi-router networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file (defaults are used without one)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of routers
    #[arg(short, long)]
    routers: Option<u32>,

    /// Hosts attached to each router
    #[arg(long)]
    hosts: Option<u32>,

    /// Minimum number of hosts each router LAN is sized for
    #[arg(long)]
    lan_min_hosts: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only produce the address plan, without the topology
    #[arg(long)]
    addresses_only: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            routers: self.routers,
            hosts_per_router: self.hosts,
            lan_min_hosts: self.lan_min_hosts,
            format: self.format,
            output: self.output.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Logs go to stderr so a plan printed to stdout stays clean
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;

    let (registry, plan) = plan_topology(&config).wrap_err("Failed to build the addressing plan")?;
    let topology = if args.addresses_only { None } else { Some(&plan) };

    match &config.general.output {
        Some(path) => report::write_plan(&registry, topology, config.general.format, path)?,
        None => print!("{}", report::render(&registry, topology, config.general.format)?),
    }

    info!("Addressing plan generated successfully");
    Ok(())
}
