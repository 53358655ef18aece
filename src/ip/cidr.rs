//! CIDR notation helpers over `ipnet::Ipv4Net`.
//!
//! An `Ipv4Net` keeps the host bits it was built with, so the same type
//! serves both a block's own network (`192.168.1.0/24`) and an interface
//! address handed out of that block (`192.168.1.7/24`). This module maps
//! `ipnet`'s parse and prefix errors into [`AddressError::InvalidCidr`].

use std::net::Ipv4Addr;

pub use ipnet::Ipv4Net;

use super::error::AddressError;

/// Parse `a.b.c.d/prefix` notation.
pub fn parse_cidr(s: &str) -> Result<Ipv4Net, AddressError> {
    s.parse::<Ipv4Net>()
        .map_err(|err| AddressError::invalid_cidr(s, err.to_string()))
}

/// Pair an address with a prefix length, keeping the host bits.
pub(crate) fn with_prefix(addr: Ipv4Addr, prefix_len: u8) -> Result<Ipv4Net, AddressError> {
    Ipv4Net::new(addr, prefix_len).map_err(|err| {
        AddressError::invalid_cidr(&format!("{}/{}", addr, prefix_len), err.to_string())
    })
}
