//! # Autonet - Addressing plans for simulated multi-router networks
//!
//! This library generates non-overlapping IPv4 addressing plans for NAT
//! topologies built in a network emulator: router LANs, NAT uplinks and
//! router-to-router links, together with the routes and NAT rules that tie
//! them together.
//!
//! ## Overview
//!
//! At the core is a hierarchical address allocator. Each logical address
//! space ("uplink", "router-mesh", "access") is a root [`ip::AddressBlock`]
//! registered in an [`ip::AddressSpaceRegistry`]. A block either issues
//! addresses sequentially under caller-chosen names, or is carved into
//! power-of-two sized subnets on demand, which in turn issue addresses.
//!
//! ## Architecture
//!
//! - `ip`: address blocks, CIDR values and the address space registry
//! - `topology`: NAT topology planning on top of the allocator
//! - `report`: text/YAML/JSON rendering of address and topology plans
//! - `config`: configuration structures and validation
//! - `config_loader`: configuration file loading and CLI overrides
//! - `utils`: subnet placement arithmetic
//!
//! ## Example Usage
//!
//! ```rust
//! use autonet::ip::AddressSpaceRegistry;
//!
//! let mut registry = AddressSpaceRegistry::new();
//! registry.register_cidr("access", "192.168.0.0/16")?;
//!
//! let access = registry.get_mut("access")?;
//! let lan = access.carve(254)?;
//! assert_eq!(lan.cidr().to_string(), "192.168.0.0/24");
//! assert_eq!(lan.issue("r1-eth1")?.to_string(), "192.168.0.1/24");
//!
//! let next = access.carve(254)?;
//! assert_eq!(next.cidr().to_string(), "192.168.1.0/24");
//! # Ok::<(), autonet::ip::AddressError>(())
//! ```
//!
//! ## Error Handling
//!
//! Allocator and configuration errors are typed (`thiserror`) so callers can
//! match on them. Application-level functions return
//! `color_eyre::eyre::Result` with context attached.

pub mod config;
pub mod config_loader;
pub mod ip;
pub mod report;
pub mod topology;
pub mod utils;
