//! Hierarchical address blocks.
//!
//! An `AddressBlock` is one contiguous IPv4 range. It either hands out
//! addresses sequentially under caller-chosen names (a leaf), or it has been
//! carved into child blocks sized for a minimum host count (subdivided).
//! A subdivided block never issues addresses again.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::Serialize;

use super::cidr::{parse_cidr, with_prefix};
use super::error::AddressError;
use crate::utils::ip_utils::{align_up, host_bits_for, range_end};

/// One address handed out by a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedAddress {
    pub name: String,
    pub address: Ipv4Net,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddressBlock {
    cidr: Ipv4Net,
    #[serde(skip)]
    gateway: Ipv4Net,
    capacity: u32,
    #[serde(rename = "next_address")]
    cursor: Option<Ipv4Addr>,
    issued: Vec<IssuedAddress>,
    #[serde(rename = "subnets")]
    children: Vec<AddressBlock>,
}

impl AddressBlock {
    /// Create a block from a CIDR string such as `"192.168.0.0/16"`.
    ///
    /// Prefixes /31 and /32 are rejected: they leave no usable host address
    /// once the network and broadcast addresses are reserved.
    pub fn new(cidr: &str) -> Result<Self, AddressError> {
        Self::from_cidr(parse_cidr(cidr)?)
    }

    /// The range starts at `cidr.addr()` as given, host bits included.
    pub fn from_cidr(cidr: Ipv4Net) -> Result<Self, AddressError> {
        if cidr.prefix_len() > 30 {
            return Err(AddressError::invalid_cidr(
                &cidr.to_string(),
                "prefix length must leave at least one usable host address (max /30)",
            ));
        }

        let base = u32::from(cidr.addr());
        let span = u32::from(cidr.hostmask());
        if base.checked_add(span).is_none() {
            return Err(AddressError::invalid_cidr(
                &cidr.to_string(),
                "range extends beyond the IPv4 address space",
            ));
        }

        // The range fits, so base + 1 does too.
        let first = Ipv4Addr::from(base + 1);

        Ok(AddressBlock {
            cidr,
            gateway: with_prefix(first, cidr.prefix_len())?,
            capacity: span - 1,
            cursor: Some(first),
            issued: Vec::new(),
            children: Vec::new(),
        })
    }

    /// The block's own network address and prefix
    pub fn cidr(&self) -> Ipv4Net {
        self.cidr
    }

    pub fn base_address(&self) -> Ipv4Addr {
        self.cidr.addr()
    }

    pub fn prefix_len(&self) -> u8 {
        self.cidr.prefix_len()
    }

    /// Number of usable host addresses: `2^(32 - prefix) - 2`
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The next address `issue` would hand out, if any
    pub fn next_address(&self) -> Option<Ipv4Addr> {
        self.cursor
    }

    pub fn issued(&self) -> &[IssuedAddress] {
        &self.issued
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    pub fn children(&self) -> &[AddressBlock] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&AddressBlock> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut AddressBlock> {
        self.children.get_mut(index)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_subdivided(&self) -> bool {
        !self.children.is_empty()
    }

    /// True for a leaf that has handed out its full capacity
    pub fn is_exhausted(&self) -> bool {
        self.is_leaf() && self.cursor.is_none()
    }

    /// The router/NAT-facing address of the block: the first address after
    /// the network address. Whether it is actually issued to a router or to a
    /// regular host is up to the caller.
    pub fn gateway(&self) -> Ipv4Net {
        self.gateway
    }

    /// Issue the next sequential address of this block under `name`.
    ///
    /// Names are labels, not keys: issuing the same name twice hands out a
    /// second, distinct address. Use [`AddressBlock::lookup`] for idempotent
    /// access.
    pub fn issue(&mut self, name: &str) -> Result<Ipv4Net, AddressError> {
        if self.is_subdivided() {
            return Err(AddressError::BlockSubdivided {
                cidr: self.cidr.to_string(),
            });
        }

        let addr = self.cursor.ok_or_else(|| AddressError::AddressSpaceExhausted {
            cidr: self.cidr.to_string(),
        })?;

        let address = with_prefix(addr, self.cidr.prefix_len())?;
        self.issued.push(IssuedAddress {
            name: name.to_string(),
            address,
        });

        // Capacity is the hard ceiling, independent of the cursor position.
        self.cursor = if self.issued.len() as u64 >= u64::from(self.capacity) {
            None
        } else {
            u32::from(addr).checked_add(1).map(Ipv4Addr::from)
        };

        log::debug!("Issued {} to {} from {}", address, name, self.cidr);
        Ok(address)
    }

    /// Issue an address for a network interface
    pub fn add_interface(&mut self, interface: &str) -> Result<Ipv4Net, AddressError> {
        self.issue(interface)
    }

    /// Issue an address for a host
    pub fn add_host(&mut self, host: &str) -> Result<Ipv4Net, AddressError> {
        self.issue(host)
    }

    /// The most recent address issued under `name` by this block
    pub fn lookup(&self, name: &str) -> Option<Ipv4Net> {
        self.issued
            .iter()
            .rev()
            .find(|record| record.name == name)
            .map(|record| record.address)
    }

    /// Like `lookup`, but searches this block and all of its subnets,
    /// depth-first in carve order.
    pub fn find(&self, name: &str) -> Option<Ipv4Net> {
        self.lookup(name)
            .or_else(|| self.children.iter().find_map(|child| child.find(name)))
    }

    /// Carve a new subnet holding at least `min_hosts` usable addresses.
    ///
    /// The first carve turns this block into a subdivided block: any
    /// addresses it issued directly are dropped and it stops issuing.
    ///
    /// Placement of the new subnet:
    /// - the first subnet starts at this block's base address;
    /// - a subnet no larger than the previous one starts right after the
    ///   previous subnet's range;
    /// - a subnet larger than the previous one starts at the end of the
    ///   previous subnet's range, rounded up to a multiple of its own size.
    ///   When the previous subnet was itself unaligned this can leave a gap.
    ///
    /// The subnet is not bounded by this block's own range.
    pub fn carve(&mut self, min_hosts: u32) -> Result<&mut AddressBlock, AddressError> {
        // A zero-host request is sized like a one-host request: /31 is unusable.
        let host_bits = host_bits_for(min_hosts.max(1));
        if host_bits > 32 {
            return Err(AddressError::SubnetTooLarge { min_hosts });
        }
        let prefix_len = (32 - host_bits) as u8;
        let size = 1u64 << host_bits;

        let base = match self.children.last() {
            None => u64::from(u32::from(self.cidr.addr())),
            Some(previous) if prefix_len < previous.prefix_len() => {
                align_up(range_end(&previous.cidr), size)
            }
            Some(previous) => range_end(&previous.cidr),
        };

        let too_large = AddressError::SubnetTooLarge { min_hosts };
        let start = u32::try_from(base).map_err(|_| too_large.clone())?;
        let child = with_prefix(Ipv4Addr::from(start), prefix_len)
            .and_then(AddressBlock::from_cidr)
            .map_err(|_| too_large)?;

        if !self.issued.is_empty() {
            log::warn!(
                "Dropping {} address(es) previously issued by {} before dividing it into subnets",
                self.issued.len(),
                self.cidr
            );
            self.issued.clear();
        }
        self.cursor = None;

        log::debug!("Carved subnet {} from {} for {} hosts", child.cidr, self.cidr, min_hosts);
        let index = self.children.len();
        self.children.push(child);
        Ok(&mut self.children[index])
    }
}
