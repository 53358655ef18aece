//! NAT firewall rules.
//!
//! Each router LAN gets four iptables rules on the NAT node: unsolicited
//! inbound traffic into the LAN is dropped, traffic from and back to the LAN
//! is forwarded, and outbound traffic is masqueraded behind the NAT.

use crate::ip::Ipv4Net;

/// Rules to apply on the NAT node for the given LANs, in order
pub fn nat_rules(outside: &str, lans: &[Ipv4Net]) -> Vec<String> {
    lans.iter()
        .flat_map(|lan| lan_rules(outside, lan, false))
        .collect()
}

/// Rules removing what [`nat_rules`] installed
pub fn nat_teardown_rules(outside: &str, lans: &[Ipv4Net]) -> Vec<String> {
    lans.iter()
        .flat_map(|lan| lan_rules(outside, lan, true))
        .collect()
}

fn lan_rules(outside: &str, lan: &Ipv4Net, teardown: bool) -> [String; 4] {
    let (insert, append) = if teardown { ("-D", "-D") } else { ("-I", "-A") };
    [
        format!("iptables {} FORWARD -i {} -d {} -j DROP", insert, outside, lan),
        format!("iptables {} FORWARD -i {} -s {} -j ACCEPT", append, outside, lan),
        format!("iptables {} FORWARD -o {} -d {} -j ACCEPT", append, outside, lan),
        format!("iptables -t nat {} POSTROUTING -s {} ! -d {} -j MASQUERADE", append, lan, lan),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_per_lan() {
        let lans: Vec<Ipv4Net> = vec!["192.168.0.0/24".parse().unwrap(), "192.168.1.0/24".parse().unwrap()];
        let rules = nat_rules("nat-eth0", &lans);
        assert_eq!(rules.len(), 8);
        assert_eq!(rules[0], "iptables -I FORWARD -i nat-eth0 -d 192.168.0.0/24 -j DROP");
        assert_eq!(
            rules[3],
            "iptables -t nat -A POSTROUTING -s 192.168.0.0/24 ! -d 192.168.0.0/24 -j MASQUERADE"
        );
        assert!(rules[4].contains("192.168.1.0/24"));
    }

    #[test]
    fn test_teardown_mirrors_rules() {
        let lans: Vec<Ipv4Net> = vec!["192.168.0.0/24".parse().unwrap()];
        let teardown = nat_teardown_rules("nat-eth0", &lans);
        assert_eq!(teardown.len(), 4);
        assert!(teardown.iter().all(|rule| rule.contains(" -D ")));
        assert_eq!(teardown[1], "iptables -D FORWARD -i nat-eth0 -s 192.168.0.0/24 -j ACCEPT");
    }

    #[test]
    fn test_no_lans_no_rules() {
        assert!(nat_rules("nat-eth0", &[]).is_empty());
    }
}
