use alloc::vec::Vec;

use crate::key::ContractKey;

/// Keys currently being resolved by one top-level lookup.
#[derive(Debug, Default)]
pub(crate) struct ResolutionFrame {
    path: Vec<ContractKey>,
}

impl ResolutionFrame {
    #[inline]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Path from the first occurrence of `key` back to `key`, if resolving it now would close a cycle
    #[must_use]
    pub(crate) fn cycle_path(&self, key: &ContractKey) -> Option<Vec<ContractKey>> {
        let start = self.path.iter().position(|active| active == key)?;
        let mut path = Vec::with_capacity(self.path.len() - start + 1);
        path.extend_from_slice(&self.path[start..]);
        path.push(*key);
        Some(path)
    }

    #[inline]
    pub(crate) fn push(&mut self, key: ContractKey) {
        self.path.push(key);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<ContractKey> {
        self.path.pop()
    }

    /// Key whose dependencies are being resolved
    #[inline]
    #[must_use]
    pub(crate) fn current(&self) -> Option<&ContractKey> {
        self.path.last()
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}
