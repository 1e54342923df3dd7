use alloc::{collections::BTreeMap, vec::Vec};
use tracing::{debug, warn};

use crate::{
    binding::{BindingDescriptor, BindingScope},
    errors::BindingErrorKind,
    key::ContractKey,
    module::{Binder, Module},
};

/// Bindings accumulated from modules, in registration order.
#[derive(Default)]
pub(crate) struct BindingRegistry {
    bindings: Vec<BindingDescriptor>,
    index: BTreeMap<ContractKey, usize>,
    errors: Vec<BindingErrorKind>,
}

impl BindingRegistry {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_module<M: Module + ?Sized>(&mut self, module: &M) {
        let mut binder = Binder::new(module.name());
        module.configure(&mut binder);

        let bindings = binder.into_bindings();
        debug!(module = module.name(), bindings = bindings.len(), "Module configured");

        for binding in bindings {
            self.add_binding(binding);
        }
    }

    /// Keeps the first binding of a key and records every later one as a duplicate
    pub(crate) fn add_binding(&mut self, binding: BindingDescriptor) {
        if let Some(&position) = self.index.get(&binding.key) {
            let err = BindingErrorKind::Duplicate {
                key: binding.key,
                first_source: self.bindings[position].source,
                second_source: binding.source,
            };
            warn!("{}", err);
            self.errors.push(err);
            return;
        }

        self.index.insert(binding.key, self.bindings.len());
        self.bindings.push(binding);
    }

    #[must_use]
    pub(crate) fn freeze(self) -> (FrozenRegistry, Vec<BindingErrorKind>) {
        (
            FrozenRegistry {
                bindings: self.bindings,
                index: self.index,
            },
            self.errors,
        )
    }
}

pub(crate) struct FrozenRegistry {
    bindings: Vec<BindingDescriptor>,
    index: BTreeMap<ContractKey, usize>,
}

impl FrozenRegistry {
    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &ContractKey) -> Option<&BindingDescriptor> {
        self.index.get(key).map(|&position| &self.bindings[position])
    }

    #[inline]
    #[must_use]
    pub(crate) fn contains(&self, key: &ContractKey) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.bindings.iter()
    }

    #[inline]
    pub(crate) fn singletons(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.bindings.iter().filter(|binding| binding.scope == BindingScope::Singleton)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    #[must_use]
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
