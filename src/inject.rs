use alloc::{sync::Arc, vec, vec::Vec};
use core::{marker::PhantomData, ops::Deref};

use crate::{
    dependency_resolver::{Dependencies, DependencyResolver},
    errors::ResolveErrorKind,
    key::{ContractKey, Qualifier},
};

/// Dependency on the unqualified binding of `Dep`.
pub struct Inject<Dep>(pub Arc<Dep>);

impl<Dep: Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    #[inline]
    fn keys() -> Vec<ContractKey> {
        vec![ContractKey::of::<Dep>()]
    }

    #[inline]
    fn resolve(dependencies: &mut Dependencies) -> Result<Self, ResolveErrorKind> {
        dependencies.take(&ContractKey::of::<Dep>()).map(Self)
    }
}

impl<Dep> Deref for Inject<Dep> {
    type Target = Dep;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Dependency on the binding of `Dep` qualified by `Q`.
pub struct InjectNamed<Dep, Q>(pub Arc<Dep>, pub PhantomData<Q>);

impl<Dep, Q> InjectNamed<Dep, Q> {
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Arc<Dep> {
        self.0
    }
}

impl<Dep: Send + Sync + 'static, Q: Qualifier> DependencyResolver for InjectNamed<Dep, Q> {
    #[inline]
    fn keys() -> Vec<ContractKey> {
        vec![ContractKey::qualified::<Dep, Q>()]
    }

    #[inline]
    fn resolve(dependencies: &mut Dependencies) -> Result<Self, ResolveErrorKind> {
        dependencies
            .take(&ContractKey::qualified::<Dep, Q>())
            .map(|dependency| Self(dependency, PhantomData))
    }
}

impl<Dep, Q> Deref for InjectNamed<Dep, Q> {
    type Target = Dep;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
