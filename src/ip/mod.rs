//! IP address allocation and management module.
//!
//! This module hands out IPv4 addresses for a simulated topology out of named
//! top-level address blocks, recursively carving blocks into subnets sized
//! for a requested host count.

pub mod block;
pub mod cidr;
pub mod error;
pub mod registry;

// Re-export commonly used types
pub use block::{AddressBlock, IssuedAddress};
pub use cidr::{parse_cidr, Ipv4Net};
pub use error::AddressError;
pub use registry::{AddressSpaceRegistry, BlockEntry, Blocks};
