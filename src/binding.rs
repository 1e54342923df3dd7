use alloc::vec::Vec;

use crate::{any::Instance, instantiator::BoxedInstantiator, key::ContractKey};

/// Lifecycle of instances produced by a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindingScope {
    /// One instance per injector, constructed once and reused
    Singleton,
    /// A fresh instance on every resolution, never cached
    #[default]
    Unscoped,
}

/// How a binding produces its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Instance,
    Constructor,
    Factory,
}

#[derive(Clone)]
pub(crate) enum Provider {
    Instance(Instance),
    Constructor {
        dependencies: Vec<ContractKey>,
        instantiator: BoxedInstantiator,
    },
    Factory {
        dependencies: Vec<ContractKey>,
        instantiator: BoxedInstantiator,
    },
}

impl Provider {
    #[inline]
    #[must_use]
    pub(crate) fn dependencies(&self) -> &[ContractKey] {
        match self {
            Provider::Instance(_) => &[],
            Provider::Constructor { dependencies, .. } | Provider::Factory { dependencies, .. } => dependencies,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) const fn kind(&self) -> ProviderKind {
        match self {
            Provider::Instance(_) => ProviderKind::Instance,
            Provider::Constructor { .. } => ProviderKind::Constructor,
            Provider::Factory { .. } => ProviderKind::Factory,
        }
    }
}

/// A contract key bound to a provider and a scope.
#[derive(Clone)]
pub struct BindingDescriptor {
    pub(crate) key: ContractKey,
    pub(crate) provider: Provider,
    pub(crate) scope: BindingScope,
    pub(crate) source: &'static str,
}

impl BindingDescriptor {
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &ContractKey {
        &self.key
    }

    #[inline]
    #[must_use]
    pub const fn scope(&self) -> BindingScope {
        self.scope
    }

    /// Name of the module that registered the binding
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    #[inline]
    #[must_use]
    pub const fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Keys resolved before the provider is called, in declaration order
    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[ContractKey] {
        self.provider.dependencies()
    }
}

impl core::fmt::Debug for BindingDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BindingDescriptor")
            .field("key", &self.key)
            .field("provider", &self.provider.kind())
            .field("dependencies", &self.provider.dependencies())
            .field("scope", &self.scope)
            .field("source", &self.source)
            .finish()
    }
}
