#[cfg(test)]
mod address_plan_tests {
    use std::io::Write;
    use tempfile::NamedTempFile;

    use autonet::config::{Config, ACCESS, ROUTER_MESH, UPLINK};
    use autonet::config_loader::load_config;
    use autonet::ip::{AddressBlock, AddressError, AddressSpaceRegistry};
    use autonet::report::{render, render_address_plan, OutputFormat};
    use autonet::topology::{plan_topology, NodeKind};

    fn subnets(block: &AddressBlock) -> Vec<String> {
        block.children().iter().map(|c| c.cidr().to_string()).collect()
    }

    /// Two /24 LANs carved from a /16 sit back to back
    #[test]
    fn test_lans_from_access_space() {
        let mut block = AddressBlock::new("192.168.0.0/16").unwrap();
        block.carve(254).unwrap();
        block.carve(254).unwrap();
        assert_eq!(subnets(&block), vec!["192.168.0.0/24", "192.168.1.0/24"]);
    }

    /// Point-to-point links carved from a /24
    #[test]
    fn test_point_to_point_links() {
        let mut block = AddressBlock::new("10.10.10.0/24").unwrap();
        for _ in 0..3 {
            block.carve(2).unwrap();
        }
        assert_eq!(
            subnets(&block),
            vec!["10.10.10.0/30", "10.10.10.4/30", "10.10.10.8/30"]
        );
    }

    /// A /24 issues 254 addresses, then runs out
    #[test]
    fn test_lan_exhaustion() {
        let mut block = AddressBlock::new("192.168.1.0/24").unwrap();
        assert_eq!(block.issue("h1").unwrap().to_string(), "192.168.1.1/24");
        assert_eq!(block.issue("h2").unwrap().to_string(), "192.168.1.2/24");
        for i in 3..=254 {
            block.issue(&format!("h{}", i)).unwrap();
        }
        assert!(matches!(
            block.issue("h255"),
            Err(AddressError::AddressSpaceExhausted { .. })
        ));
    }

    /// A /30 holds exactly two interfaces
    #[test]
    fn test_point_to_point_exhaustion() {
        let mut block = AddressBlock::new("10.10.10.0/30").unwrap();
        assert_eq!(block.issue("r1").unwrap().to_string(), "10.10.10.1/30");
        assert_eq!(block.issue("r2").unwrap().to_string(), "10.10.10.2/30");
        assert!(matches!(
            block.issue("r3"),
            Err(AddressError::AddressSpaceExhausted { .. })
        ));
    }

    #[test]
    fn test_exhaustion_for_every_small_prefix() {
        for prefix in 22..=30u8 {
            let mut block = AddressBlock::new(&format!("10.0.0.0/{}", prefix)).unwrap();
            for i in 0..block.capacity() {
                block.issue(&format!("n{}", i)).unwrap();
            }
            assert!(block.is_exhausted());
            assert!(block.issue("overflow").is_err());
        }
    }

    #[test]
    fn test_subdivided_blocks_never_issue() {
        let mut block = AddressBlock::new("172.16.0.0/12").unwrap();
        block.issue("early").unwrap();
        block.carve(1000).unwrap();
        block.carve(10).unwrap();
        assert!(matches!(
            block.issue("late"),
            Err(AddressError::BlockSubdivided { .. })
        ));
        assert!(block.lookup("early").is_none());
    }

    #[test]
    fn test_plan_from_config_file() {
        let yaml = r#"
address_spaces:
  uplink: 172.16.0.0/16
  router_mesh: 10.10.10.0/24
  access: 192.168.0.0/16
topology:
  routers: 3
  hosts_per_router: 2
  lan_min_hosts: 254
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", yaml).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        let (registry, plan) = plan_topology(&config).unwrap();

        assert_eq!(
            subnets(registry.get(ACCESS).unwrap()),
            vec!["192.168.0.0/24", "192.168.1.0/24", "192.168.2.0/24"]
        );
        assert_eq!(registry.get(ROUTER_MESH).unwrap().children().len(), 3);
        assert_eq!(registry.get(UPLINK).unwrap().issued_count(), 6);
        assert_eq!(plan.nodes_of_kind(NodeKind::Host).count(), 6);

        // Every planned interface address is unique
        let mut addresses: Vec<_> = plan
            .nodes
            .iter()
            .flat_map(|node| node.interfaces.iter().filter_map(|intf| intf.address))
            .map(|cidr| cidr.addr())
            .collect();
        let total = addresses.len();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), total);
    }

    #[test]
    fn test_plans_are_reproducible() {
        let first = plan_topology(&Config::default()).unwrap();
        let second = plan_topology(&Config::default()).unwrap();
        assert_eq!(render_address_plan(&first.0), render_address_plan(&second.0));
        assert_eq!(
            render(&first.0, Some(&first.1), OutputFormat::Json).unwrap(),
            render(&second.0, Some(&second.1), OutputFormat::Json).unwrap()
        );
    }

    #[test]
    fn test_text_report_lists_every_address() {
        let (registry, plan) = plan_topology(&Config::default()).unwrap();
        let text = render(&registry, Some(&plan), OutputFormat::Text).unwrap();
        assert!(text.contains("access: 192.168.0.0/16"));
        assert!(text.contains("  Subnet: 192.168.1.0/24"));
        assert!(text.contains("    h6-eth0: 192.168.1.4/24"));
        assert!(text.contains("r1: ip route add 192.168.1.0/24 via 10.10.10.1 dev r1-eth2"));
        assert!(text.contains("iptables -t nat -A POSTROUTING -s 192.168.1.0/24 ! -d 192.168.1.0/24 -j MASQUERADE"));
    }

    #[test]
    fn test_registry_misuse() {
        let mut registry = AddressSpaceRegistry::new();
        registry.register_cidr(UPLINK, "172.16.0.0/16").unwrap();
        assert!(matches!(
            registry.register_cidr(UPLINK, "172.17.0.0/16"),
            Err(AddressError::DuplicateLabel(_))
        ));
        assert!(matches!(
            registry.get(ACCESS),
            Err(AddressError::UnknownLabel(_))
        ));
    }
}
