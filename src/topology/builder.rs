//! NAT topology planning.
//!
//! Builds a topology of N routers behind one NAT node. Each router has its
//! own LAN (carved from the access space) with its hosts behind a switch, an
//! uplink to the NAT (issued from the flat uplink pool), and a point-to-point
//! link to every other router (each carved from the router mesh space).
//!
//! ```text
//!              nat
//!            /     \
//!         r1 ------- r2
//!         |           |
//!         s1          s2
//!       / | \       / | \
//!     h1 h2 h3    h4 h5 h6
//! ```

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;

use super::nat::{nat_rules, nat_teardown_rules};
use super::types::{Destination, Endpoint, Interface, Link, Node, NodeKind, Route, TopologyPlan};
use crate::config::{Config, TopologyConfig, ACCESS, ROUTER_MESH, UPLINK};
use crate::ip::{AddressSpaceRegistry, Ipv4Net};

/// Name of the NAT node
pub const NAT: &str = "nat";
/// The NAT's outside interface, which the firewall rules refer to
pub const NAT_OUTSIDE: &str = "nat-eth0";

/// Register the configured seed address spaces in a fresh registry
pub fn address_spaces(config: &Config) -> Result<AddressSpaceRegistry> {
    let mut registry = AddressSpaceRegistry::new();
    for (label, cidr) in config.address_spaces.labeled() {
        registry
            .register_cidr(label, cidr)
            .wrap_err_with(|| format!("Failed to register address space '{}'", label))?;
    }
    Ok(registry)
}

/// Build the address spaces and the topology plan for a configuration
pub fn plan_topology(config: &Config) -> Result<(AddressSpaceRegistry, TopologyPlan)> {
    let mut registry = address_spaces(config)?;
    let plan = build_nat_topology(&config.topology, &mut registry)?;
    Ok((registry, plan))
}

/// Plan the NAT topology, addressing every interface out of `registry`.
///
/// The registry must contain the `uplink`, `router-mesh` and `access`
/// spaces. Any allocation failure aborts the whole plan.
pub fn build_nat_topology(topology: &TopologyConfig, registry: &mut AddressSpaceRegistry) -> Result<TopologyPlan> {
    let routers = topology.routers;
    let hosts_per_router = topology.hosts_per_router;
    let lan_size = topology.lan_size();
    let uplink_port = routers + 1;

    info!(
        "Planning NAT topology: {} routers, {} hosts per router, LANs sized for {} hosts",
        routers, hosts_per_router, lan_size
    );

    let mut plan = TopologyPlan::default();
    let mut nat = Node::new(NAT, NodeKind::Nat);
    nat.interfaces.push(Interface {
        name: NAT_OUTSIDE.to_string(),
        address: None,
    });

    let mut router_nodes: Vec<Node> = Vec::new();
    let mut switch_nodes: Vec<Node> = Vec::new();
    let mut host_nodes: Vec<Node> = Vec::new();
    let mut lans: Vec<Ipv4Net> = Vec::new();
    let mut host_number = 0u32;

    for i in 1..=routers {
        let router_name = format!("r{}", i);
        let switch_name = format!("s{}", i);
        let mut router = Node::new(&router_name, NodeKind::Router);
        let mut switch = Node::new(&switch_name, NodeKind::Switch);

        // Router LAN: the router takes the first address, hosts follow.
        let lan_intf = format!("r{}-eth{}", i, i);
        let lan = registry
            .get_mut(ACCESS)
            .and_then(|access| access.carve(lan_size))
            .wrap_err_with(|| format!("Failed to carve LAN for router {}", router_name))?;
        let lan_cidr = lan.cidr();
        let gateway = lan
            .add_interface(&lan_intf)
            .wrap_err_with(|| format!("Failed to address {}", lan_intf))?;

        let mut lan_hosts = Vec::new();
        for _ in 0..hosts_per_router {
            host_number += 1;
            let host_intf = format!("h{}-eth0", host_number);
            let address = lan
                .add_host(&host_intf)
                .wrap_err_with(|| format!("Failed to address {}", host_intf))?;
            lan_hosts.push((format!("h{}", host_number), host_intf, address));
        }
        info!("Router {} LAN {} (gateway {})", router_name, lan_cidr, gateway);

        router.interfaces.push(Interface {
            name: lan_intf.clone(),
            address: Some(gateway),
        });
        let switch_port = format!("{}-eth1", switch_name);
        switch.interfaces.push(Interface {
            name: switch_port.clone(),
            address: None,
        });
        plan.links.push(link(&router_name, &lan_intf, &switch_name, &switch_port));

        for (port, (host_name, host_intf, address)) in (2..).zip(lan_hosts) {
            let mut host = Node::new(&host_name, NodeKind::Host);
            host.interfaces.push(Interface {
                name: host_intf.clone(),
                address: Some(address),
            });
            let switch_port = format!("{}-eth{}", switch_name, port);
            switch.interfaces.push(Interface {
                name: switch_port.clone(),
                address: None,
            });
            plan.links.push(link(&host_name, &host_intf, &switch_name, &switch_port));
            plan.routes.push(Route {
                node: host_name.clone(),
                destination: Destination::Default,
                via: gateway.addr(),
                dev: host_intf,
            });
            host_nodes.push(host);
        }

        // Uplink to the NAT.
        let nat_intf = format!("nat-eth{}", i);
        let router_uplink = format!("r{}-eth{}", i, uplink_port);
        let uplink = registry.get_mut(UPLINK)?;
        let nat_address = uplink
            .add_interface(&nat_intf)
            .wrap_err_with(|| format!("Failed to address {}", nat_intf))?;
        let router_address = uplink
            .add_interface(&router_uplink)
            .wrap_err_with(|| format!("Failed to address {}", router_uplink))?;

        nat.interfaces.push(Interface {
            name: nat_intf.clone(),
            address: Some(nat_address),
        });
        router.interfaces.push(Interface {
            name: router_uplink.clone(),
            address: Some(router_address),
        });
        plan.links.push(link(NAT, &nat_intf, &router_name, &router_uplink));
        plan.routes.push(Route {
            node: router_name.clone(),
            destination: Destination::Default,
            via: nat_address.addr(),
            dev: router_uplink,
        });
        plan.routes.push(Route {
            node: NAT.to_string(),
            destination: Destination::Subnet(lan_cidr),
            via: router_address.addr(),
            dev: nat_intf,
        });

        // Point-to-point links to every previous router.
        for j in 1..i {
            let peer_index = (j - 1) as usize;
            let peer_name = format!("r{}", j);
            let near = format!("r{}-eth{}", i, j);
            let far = format!("r{}-eth{}", j, i);

            let p2p = registry
                .get_mut(ROUTER_MESH)
                .and_then(|mesh| mesh.carve(2))
                .wrap_err_with(|| format!("Failed to carve link {} <-> {}", router_name, peer_name))?;
            let near_address = p2p
                .add_interface(&near)
                .wrap_err_with(|| format!("Failed to address {}", near))?;
            let far_address = p2p
                .add_interface(&far)
                .wrap_err_with(|| format!("Failed to address {}", far))?;
            info!("Link {} <-> {} on {}", router_name, peer_name, p2p.cidr());

            router.interfaces.push(Interface {
                name: near.clone(),
                address: Some(near_address),
            });
            router_nodes[peer_index].interfaces.push(Interface {
                name: far.clone(),
                address: Some(far_address),
            });
            plan.links.push(link(&router_name, &near, &peer_name, &far));

            plan.routes.push(Route {
                node: router_name.clone(),
                destination: Destination::Subnet(lans[peer_index]),
                via: far_address.addr(),
                dev: near.clone(),
            });
            plan.routes.push(Route {
                node: peer_name,
                destination: Destination::Subnet(lan_cidr),
                via: near_address.addr(),
                dev: far,
            });
        }

        lans.push(lan_cidr);
        router_nodes.push(router);
        switch_nodes.push(switch);
    }

    plan.nat_rules = nat_rules(NAT_OUTSIDE, &lans);
    plan.nat_teardown = nat_teardown_rules(NAT_OUTSIDE, &lans);

    plan.nodes.push(nat);
    plan.nodes.extend(router_nodes);
    plan.nodes.extend(switch_nodes);
    plan.nodes.extend(host_nodes);

    info!(
        "Topology planned: {} nodes, {} links, {} routes",
        plan.nodes.len(),
        plan.links.len(),
        plan.routes.len()
    );
    Ok(plan)
}

fn link(a_node: &str, a_intf: &str, b_node: &str, b_intf: &str) -> Link {
    Link {
        a: Endpoint {
            node: a_node.to_string(),
            interface: a_intf.to_string(),
        },
        b: Endpoint {
            node: b_node.to_string(),
            interface: b_intf.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ip::AddressError;

    fn addr(plan: &TopologyPlan, node: &str, intf: &str) -> String {
        plan.node(node).unwrap().address(intf).unwrap().to_string()
    }

    #[test]
    fn test_two_routers_three_hosts() {
        let (registry, plan) = plan_topology(&Config::default()).unwrap();

        assert_eq!(plan.nodes_of_kind(NodeKind::Router).count(), 2);
        assert_eq!(plan.nodes_of_kind(NodeKind::Switch).count(), 2);
        assert_eq!(plan.nodes_of_kind(NodeKind::Host).count(), 6);

        assert_eq!(addr(&plan, "r1", "r1-eth1"), "192.168.0.1/24");
        assert_eq!(addr(&plan, "h1", "h1-eth0"), "192.168.0.2/24");
        assert_eq!(addr(&plan, "h3", "h3-eth0"), "192.168.0.4/24");
        assert_eq!(addr(&plan, "r2", "r2-eth2"), "192.168.1.1/24");
        assert_eq!(addr(&plan, "h4", "h4-eth0"), "192.168.1.2/24");

        assert_eq!(addr(&plan, "nat", "nat-eth1"), "172.16.0.1/16");
        assert_eq!(addr(&plan, "r1", "r1-eth3"), "172.16.0.2/16");
        assert_eq!(addr(&plan, "nat", "nat-eth2"), "172.16.0.3/16");
        assert_eq!(addr(&plan, "r2", "r2-eth3"), "172.16.0.4/16");

        assert_eq!(addr(&plan, "r2", "r2-eth1"), "10.10.10.1/30");
        assert_eq!(addr(&plan, "r1", "r1-eth2"), "10.10.10.2/30");

        let mesh = registry.get(ROUTER_MESH).unwrap();
        assert_eq!(mesh.children().len(), 1);
    }

    #[test]
    fn test_routes() {
        let (_, plan) = plan_topology(&Config::default()).unwrap();

        let h1: Vec<String> = plan.routes_for("h1").map(|r| r.to_string()).collect();
        assert_eq!(h1, vec!["default via 192.168.0.1 dev h1-eth0"]);

        let r1: Vec<String> = plan.routes_for("r1").map(|r| r.to_string()).collect();
        assert_eq!(
            r1,
            vec![
                "default via 172.16.0.1 dev r1-eth3",
                "192.168.1.0/24 via 10.10.10.1 dev r1-eth2",
            ]
        );

        let r2: Vec<String> = plan.routes_for("r2").map(|r| r.to_string()).collect();
        assert_eq!(
            r2,
            vec![
                "default via 172.16.0.3 dev r2-eth3",
                "192.168.0.0/24 via 10.10.10.2 dev r2-eth1",
            ]
        );

        let nat: Vec<String> = plan.routes_for("nat").map(|r| r.to_string()).collect();
        assert_eq!(
            nat,
            vec![
                "192.168.0.0/24 via 172.16.0.2 dev nat-eth1",
                "192.168.1.0/24 via 172.16.0.4 dev nat-eth2",
            ]
        );
    }

    #[test]
    fn test_full_mesh_links() {
        let mut config = Config::default();
        config.topology.routers = 4;
        config.topology.hosts_per_router = 1;
        let (registry, plan) = plan_topology(&config).unwrap();

        // 4 router-switch, 4 host-switch, 4 uplinks, 6 mesh links
        assert_eq!(plan.links.len(), 18);
        let mesh = registry.get(ROUTER_MESH).unwrap();
        let subnets: Vec<String> = mesh.children().iter().map(|c| c.cidr().to_string()).collect();
        assert_eq!(
            subnets,
            vec![
                "10.10.10.0/30",
                "10.10.10.4/30",
                "10.10.10.8/30",
                "10.10.10.12/30",
                "10.10.10.16/30",
                "10.10.10.20/30",
            ]
        );
        // r4 reaches the three other LANs through the mesh
        assert_eq!(plan.routes_for("r4").count(), 4);
        assert_eq!(plan.nat_rules.len(), 16);
        assert_eq!(plan.nat_teardown.len(), 16);
    }

    #[test]
    fn test_small_lans() {
        let mut config = Config::default();
        config.topology.hosts_per_router = 1;
        config.topology.lan_min_hosts = 1;
        let (registry, plan) = plan_topology(&config).unwrap();

        let access = registry.get(ACCESS).unwrap();
        let lans: Vec<String> = access.children().iter().map(|c| c.cidr().to_string()).collect();
        assert_eq!(lans, vec!["192.168.0.0/30", "192.168.0.4/30"]);
        assert!(access.child(0).unwrap().is_exhausted());
        assert_eq!(addr(&plan, "h2", "h2-eth0"), "192.168.0.6/30");
    }

    #[test]
    fn test_exhausted_uplink_aborts() {
        let mut config = Config::default();
        config.address_spaces.uplink = "172.16.0.0/30".to_string();
        let err = plan_topology(&config).unwrap_err();

        let source = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<AddressError>())
            .unwrap();
        assert!(matches!(source, AddressError::AddressSpaceExhausted { .. }));
        assert!(err.to_string().contains("nat-eth2"));
    }

    #[test]
    fn test_missing_space() {
        let mut registry = AddressSpaceRegistry::new();
        registry.register_cidr(ACCESS, "192.168.0.0/16").unwrap();
        let result = build_nat_topology(&TopologyConfig::default(), &mut registry);
        assert!(result.is_err());
    }
}
