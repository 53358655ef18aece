//! Address space registry.
//!
//! This file keeps the named top-level address blocks of one topology build
//! (e.g. "uplink", "router-mesh", "access") and walks them for reporting.

use super::block::AddressBlock;
use super::error::AddressError;

/// Insertion-ordered collection of root address blocks, keyed by label
#[derive(Debug, Default)]
pub struct AddressSpaceRegistry {
    spaces: Vec<(String, AddressBlock)>,
}

/// One block visited by [`AddressSpaceRegistry::enumerate`]
#[derive(Debug, Clone, Copy)]
pub struct BlockEntry<'a> {
    /// Label of the root block this entry belongs to
    pub label: &'a str,
    /// 0 for a root block, 1 for its subnets, and so on
    pub depth: usize,
    pub block: &'a AddressBlock,
}

impl AddressSpaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root block under `label`
    pub fn register(&mut self, label: &str, block: AddressBlock) -> Result<&mut AddressBlock, AddressError> {
        if self.position(label).is_some() {
            return Err(AddressError::DuplicateLabel(label.to_string()));
        }
        log::debug!("Registered address space {} = {}", label, block.cidr());
        let index = self.spaces.len();
        self.spaces.push((label.to_string(), block));
        Ok(&mut self.spaces[index].1)
    }

    /// Parse `cidr` into a fresh block and register it under `label`
    pub fn register_cidr(&mut self, label: &str, cidr: &str) -> Result<&mut AddressBlock, AddressError> {
        let block = AddressBlock::new(cidr)?;
        self.register(label, block)
    }

    pub fn get(&self, label: &str) -> Result<&AddressBlock, AddressError> {
        self.position(label)
            .map(|index| &self.spaces[index].1)
            .ok_or_else(|| AddressError::UnknownLabel(label.to_string()))
    }

    pub fn get_mut(&mut self, label: &str) -> Result<&mut AddressBlock, AddressError> {
        match self.position(label) {
            Some(index) => Ok(&mut self.spaces[index].1),
            None => Err(AddressError::UnknownLabel(label.to_string())),
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.spaces.iter().map(|(label, _)| label.as_str())
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Walk every block depth-first: each root, then its subnets recursively,
    /// in insertion order at every level. The walk is lazy and can be
    /// restarted by calling `enumerate` again.
    pub fn enumerate(&self) -> Blocks<'_> {
        let mut stack: Vec<BlockEntry<'_>> = self
            .spaces
            .iter()
            .map(|(label, block)| BlockEntry {
                label: label.as_str(),
                depth: 0,
                block,
            })
            .collect();
        stack.reverse();
        Blocks { stack }
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.spaces.iter().position(|(existing, _)| existing == label)
    }
}

/// Depth-first iterator over the blocks of a registry
#[derive(Debug)]
pub struct Blocks<'a> {
    stack: Vec<BlockEntry<'a>>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = BlockEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        // Pushed in reverse so the first subnet is visited first.
        for child in entry.block.children().iter().rev() {
            self.stack.push(BlockEntry {
                label: entry.label,
                depth: entry.depth + 1,
                block: child,
            });
        }
        Some(entry)
    }
}
