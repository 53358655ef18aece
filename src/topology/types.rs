//! Topology plan type definitions.
//!
//! A `TopologyPlan` is the fully addressed description of a NAT topology:
//! nodes and their interfaces, the links between them, route directives and
//! NAT firewall rules. It is data only; nothing here touches the host.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Serialize, Serializer};

use crate::ip::Ipv4Net;

/// Role of a node in the topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Nat,
    Router,
    Switch,
    Host,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Nat => "nat",
            NodeKind::Router => "router",
            NodeKind::Switch => "switch",
            NodeKind::Host => "host",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub name: String,
    /// Switch ports and the NAT's outside interface carry no planned address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Net>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub interfaces: Vec<Interface>,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            interfaces: Vec::new(),
        }
    }

    /// Address of one of this node's interfaces
    pub fn address(&self, interface: &str) -> Option<Ipv4Net> {
        self.interfaces
            .iter()
            .find(|intf| intf.name == interface)
            .and_then(|intf| intf.address)
    }
}

/// One side of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub node: String,
    pub interface: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub a: Endpoint,
    pub b: Endpoint,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} <-> {}:{}",
            self.a.node, self.a.interface, self.b.node, self.b.interface
        )
    }
}

/// Where a route leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Default,
    Subnet(Ipv4Net),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Default => f.write_str("default"),
            Destination::Subnet(cidr) => write!(f, "{}", cidr),
        }
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A route directive for one node: `<destination> via <address> dev <interface>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub node: String,
    pub destination: Destination,
    pub via: Ipv4Addr,
    pub dev: String,
}

impl Route {
    /// The `ip route add` command installing this route on its node
    pub fn command(&self) -> String {
        format!("ip route add {}", self)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {} dev {}", self.destination, self.via, self.dev)
    }
}

/// Fully addressed NAT topology
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopologyPlan {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub routes: Vec<Route>,
    /// Firewall rules to apply on the NAT node, in order
    pub nat_rules: Vec<String>,
    /// Rules removing `nat_rules` again
    pub nat_teardown: Vec<String>,
}

impl TopologyPlan {
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Routes configured on one node, in plan order
    pub fn routes_for<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a Route> + 'a {
        self.routes.iter().filter(move |route| route.node == node)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }
}
