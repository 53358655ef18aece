//! Errors raised by the address-space allocator.

/// Errors that can occur while building an addressing plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid CIDR '{cidr}': {reason}")]
    InvalidCidr { cidr: String, reason: String },

    #[error("Address space exhausted in {cidr}")]
    AddressSpaceExhausted { cidr: String },

    #[error("Block {cidr} has been divided into subnets and cannot issue addresses")]
    BlockSubdivided { cidr: String },

    #[error("Subnet for {min_hosts} hosts does not fit in the IPv4 address space")]
    SubnetTooLarge { min_hosts: u32 },

    #[error("Address space label already registered: {0}")]
    DuplicateLabel(String),

    #[error("Unknown address space label: {0}")]
    UnknownLabel(String),
}

impl AddressError {
    pub(crate) fn invalid_cidr(cidr: &str, reason: impl Into<String>) -> Self {
        AddressError::InvalidCidr {
            cidr: cidr.to_string(),
            reason: reason.into(),
        }
    }
}
