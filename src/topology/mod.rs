//! Network topology module.
//!
//! This module plans a NAT-fronted multi-router topology on top of the
//! address allocator: nodes, links, interface addresses, routes and NAT rules.

pub mod builder;
pub mod nat;
pub mod types;

// Re-export key types and functions for easier access
pub use builder::{address_spaces, build_nat_topology, plan_topology, NAT, NAT_OUTSIDE};
pub use types::{Destination, Endpoint, Interface, Link, Node, NodeKind, Route, TopologyPlan};
