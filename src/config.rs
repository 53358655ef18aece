//! Configuration types for the planner.
//!
//! Mirrors the YAML file: output settings, the three named address spaces and
//! the topology size. `Config::validate` checks that every address space parses
//! as a usable block and that the topology has at least one router.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ip::AddressBlock;
use crate::report::OutputFormat;

/// Registry label of the NAT-router address space
pub const UPLINK: &str = "uplink";
/// Registry label of the router-router address space
pub const ROUTER_MESH: &str = "router-mesh";
/// Registry label of the router-host address space
pub const ACCESS: &str = "access";

/// Top-level configuration that mirrors the YAML file. Every section is
/// optional; missing values fall back to the defaults below.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub address_spaces: AddressSpaces,
    pub topology: TopologyConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.address_spaces.validate()?;
        self.topology.validate()?;

        if let Some(output) = &self.general.output {
            if output.as_os_str().is_empty() {
                return Err(ValidationError::InvalidGeneral(
                    "output path cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Output settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Seed CIDRs of the three address spaces of a NAT topology
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AddressSpaces {
    /// NAT to router links (flat pool)
    pub uplink: String,
    /// Router to router point-to-point links (carved into /30s)
    pub router_mesh: String,
    /// Router LANs (carved once per router)
    pub access: String,
}

impl AddressSpaces {
    /// The spaces paired with their registry labels, in registration order
    pub fn labeled(&self) -> [(&'static str, &str); 3] {
        [
            (UPLINK, self.uplink.as_str()),
            (ROUTER_MESH, self.router_mesh.as_str()),
            (ACCESS, self.access.as_str()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (label, cidr) in self.labeled() {
            let block = AddressBlock::new(cidr).map_err(|e| {
                ValidationError::InvalidAddressSpace(format!("{}: {}", label, e))
            })?;

            if !block.base_address().is_private() {
                log::warn!(
                    "Address space {} ({}) is outside the RFC 1918 private ranges",
                    label,
                    cidr
                );
            }
        }
        Ok(())
    }
}

impl Default for AddressSpaces {
    fn default() -> Self {
        Self {
            uplink: "172.16.0.0/16".to_string(),
            router_mesh: "10.10.10.0/24".to_string(),
            access: "192.168.0.0/16".to_string(),
        }
    }
}

/// Shape of the generated topology
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TopologyConfig {
    /// Number of routers, each with its own LAN
    pub routers: u32,
    /// Hosts attached to each router's LAN
    pub hosts_per_router: u32,
    /// Minimum size of each LAN; raised automatically when the hosts and
    /// the router would not fit
    pub lan_min_hosts: u32,
}

impl TopologyConfig {
    /// Host count each LAN is carved for
    pub fn lan_size(&self) -> u32 {
        self.lan_min_hosts.max(self.hosts_per_router.saturating_add(1))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.routers == 0 {
            return Err(ValidationError::InvalidTopology(
                "routers must be at least 1".to_string(),
            ));
        }
        if self.lan_min_hosts == 0 {
            return Err(ValidationError::InvalidTopology(
                "lan_min_hosts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            routers: 2,
            hosts_per_router: 3,
            lan_min_hosts: 254,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid address space: {0}")]
    InvalidAddressSpace(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
}
