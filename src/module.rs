use alloc::{sync::Arc, vec::Vec};
use core::{any::type_name, marker::PhantomData};
use tracing::debug;

use crate::{
    any::Instance,
    binding::{BindingDescriptor, BindingScope, Provider},
    dependency_resolver::DependencyResolver,
    errors::InstantiateErrorKind,
    instantiator::{boxed_constructor, boxed_factory, Injectable, Instantiator},
    key::{ContractKey, Qualifier},
};

/// A unit of configuration contributing bindings to an injector.
///
/// Any `Fn(&mut Binder)` closure is a module.
pub trait Module {
    fn configure(&self, binder: &mut Binder);

    /// Name used in diagnostics, e.g. for duplicate bindings
    #[must_use]
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl<F> Module for F
where
    F: Fn(&mut Binder),
{
    #[inline]
    fn configure(&self, binder: &mut Binder) {
        self(binder);
    }
}

/// Collects the bindings declared by a module.
pub struct Binder {
    source: &'static str,
    bindings: Vec<BindingDescriptor>,
}

impl Binder {
    #[inline]
    #[must_use]
    pub(crate) const fn new(source: &'static str) -> Self {
        Self {
            source,
            bindings: Vec::new(),
        }
    }

    /// Starts a binding for `T`.
    /// Nothing is registered until one of the `to_*` methods is called.
    #[inline]
    #[must_use]
    pub fn bind<T: Send + Sync + 'static>(&mut self) -> BindingBuilder<'_, T> {
        BindingBuilder {
            binder: self,
            key: ContractKey::of::<T>(),
            scope: BindingScope::default(),
            _provides: PhantomData,
        }
    }

    /// Adds the bindings of another module, tagged with that module's name.
    pub fn install<M: Module + ?Sized>(&mut self, module: &M) {
        let mut binder = Binder::new(module.name());
        module.configure(&mut binder);

        debug!(module = module.name(), bindings = binder.bindings.len(), "Module installed");

        self.bindings.append(&mut binder.bindings);
    }

    /// Name of the module being configured
    #[inline]
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    #[inline]
    #[must_use]
    pub(crate) fn into_bindings(self) -> Vec<BindingDescriptor> {
        self.bindings
    }

    #[inline]
    fn push(&mut self, key: ContractKey, provider: Provider, scope: BindingScope) {
        self.bindings.push(BindingDescriptor {
            key,
            provider,
            scope,
            source: self.source,
        });
    }
}

#[must_use = "a binding is registered only by one of the `to_*` methods"]
pub struct BindingBuilder<'a, T> {
    binder: &'a mut Binder,
    key: ContractKey,
    scope: BindingScope,
    _provides: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> BindingBuilder<'_, T> {
    #[inline]
    pub fn named(mut self, name: &'static str) -> Self {
        self.key = self.key.with_qualifier(name);
        self
    }

    #[inline]
    pub fn qualified_by<Q: Qualifier>(self) -> Self {
        self.named(Q::NAME)
    }

    #[inline]
    pub fn in_scope(mut self, scope: BindingScope) -> Self {
        self.scope = scope;
        self
    }

    #[inline]
    pub fn as_singleton(self) -> Self {
        self.in_scope(BindingScope::Singleton)
    }

    /// Binds to a value built outside the injector.
    /// Every resolution returns this same instance, whatever the scope.
    pub fn to_instance(self, value: T) {
        let instance: Instance = Arc::new(value);
        self.binder.push(self.key, Provider::Instance(instance), self.scope);
    }

    /// Binds to an implementation type the injector constructs and converts into `T`.
    pub fn to<Impl>(self)
    where
        Impl: Injectable + Into<T>,
    {
        self.binder.push(
            self.key,
            Provider::Constructor {
                dependencies: Impl::Dependencies::keys(),
                instantiator: boxed_constructor::<Impl, T>(),
            },
            self.scope,
        );
    }

    /// Binds `T` to its own [`Injectable`] implementation.
    pub fn to_self(self)
    where
        T: Injectable,
    {
        self.to::<T>();
    }

    /// Binds to a provider function whose arguments declare its dependencies.
    pub fn to_factory<Inst, Deps>(self, instantiator: Inst)
    where
        Inst: Instantiator<Deps, Provides = T, Error = InstantiateErrorKind>,
        Deps: DependencyResolver + 'static,
    {
        self.binder.push(
            self.key,
            Provider::Factory {
                dependencies: Deps::keys(),
                instantiator: boxed_factory(instantiator),
            },
            self.scope,
        );
    }
}
