use alloc::{boxed::Box, vec::Vec};
use core::{
    any::TypeId,
    fmt::{self, Display, Formatter},
};

use super::instantiate::InstantiateErrorKind;
use crate::key::ContractKey;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("No binding registered for {key}{}", RequiredBy(required_by.as_ref()))]
    MissingBinding {
        key: ContractKey,
        required_by: Option<ContractKey>,
    },
    #[error("Circular dependency detected: {}", CyclePath(path))]
    CircularDependency { path: Vec<ContractKey> },
    #[error("Incorrect provided type for {expected}. Actual type id: {actual:?}")]
    IncorrectType { expected: ContractKey, actual: TypeId },
    #[error("Provider for {key} failed: {source}")]
    Instantiate {
        key: ContractKey,
        source: Box<InstantiateErrorKind>,
    },
}

impl ResolveErrorKind {
    /// Key whose resolution failed first: the missing or failing binding, or the start of a cycle.
    #[inline]
    #[must_use]
    pub fn failed_key(&self) -> Option<&ContractKey> {
        match self {
            ResolveErrorKind::MissingBinding { key, .. } | ResolveErrorKind::Instantiate { key, .. } => Some(key),
            ResolveErrorKind::IncorrectType { expected, .. } => Some(expected),
            ResolveErrorKind::CircularDependency { path } => path.first(),
        }
    }

    /// Keys of the detected cycle, starting and ending with the same key.
    #[inline]
    #[must_use]
    pub fn cycle_path(&self) -> Option<&[ContractKey]> {
        match self {
            ResolveErrorKind::CircularDependency { path } => Some(path),
            _ => None,
        }
    }
}

struct RequiredBy<'a>(Option<&'a ContractKey>);

impl Display for RequiredBy<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, " (required by {key})"),
            None => Ok(()),
        }
    }
}

struct CyclePath<'a>(&'a [ContractKey]);

impl Display for CyclePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = self.0.iter();
        if let Some(first) = keys.next() {
            write!(f, "{first}")?;
        }
        for key in keys {
            write!(f, " -> {key}")?;
        }
        Ok(())
    }
}
