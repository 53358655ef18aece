//! IPv4 arithmetic used by subnet placement.
//!
//! Range ends are computed in `u64` so a range that finishes exactly at
//! `255.255.255.255` still has a representable end.

use ipnet::Ipv4Net;

/// Number of host bits needed for a block holding at least `min_hosts`
/// usable addresses, reserving the network and broadcast addresses.
///
/// Equivalent to `ceil(log2(min_hosts + 2))`.
pub fn host_bits_for(min_hosts: u32) -> u32 {
    let needed = u64::from(min_hosts) + 1;
    u64::BITS - needed.leading_zeros()
}

/// Round `value` up to a multiple of `alignment` (a power of two)
pub fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// First address past the range that starts at `net.addr()`
pub fn range_end(net: &Ipv4Net) -> u64 {
    u64::from(u32::from(net.addr())) + u64::from(u32::from(net.hostmask())) + 1
}
