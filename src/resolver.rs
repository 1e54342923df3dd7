use alloc::{boxed::Box, vec::Vec};
use tracing::{debug, debug_span, error};

use crate::{
    any::Instance,
    binding::{BindingDescriptor, Provider},
    cache::SingletonCache,
    dependency_resolver::Dependencies,
    errors::{InstantiatorErrorKind, ResolveErrorKind},
    frame::ResolutionFrame,
    instantiator::BoxedInstantiator,
    key::ContractKey,
    registry::FrozenRegistry,
    service::Service as _,
    stage::{decide, CallSite, Stage},
};

/// Resolves keys against a frozen registry, caching singletons.
pub(crate) struct Resolver<'a> {
    pub(crate) registry: &'a FrozenRegistry,
    pub(crate) cache: &'a SingletonCache,
    pub(crate) stage: Stage,
}

impl Resolver<'_> {
    pub(crate) fn resolve(&self, key: &ContractKey, frame: &mut ResolutionFrame) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("resolve", key = %key);
        let _guard = span.enter();

        if let Some(path) = frame.cycle_path(key) {
            let err = ResolveErrorKind::CircularDependency { path };
            error!("{}", err);
            return Err(err);
        }

        let Some(binding) = self.registry.get(key) else {
            let err = ResolveErrorKind::MissingBinding {
                key: *key,
                required_by: frame.current().copied(),
            };
            error!("{}", err);
            return Err(err);
        };

        if let Provider::Instance(instance) = &binding.provider {
            debug!("Bound to instance");
            return Ok(instance.clone());
        }

        if decide(binding.scope, self.stage, CallSite::Lookup).uses_cache() {
            self.cache.get_or_construct(key, || self.construct(binding, frame))
        } else {
            self.construct(binding, frame)
        }
    }

    fn construct(&self, binding: &BindingDescriptor, frame: &mut ResolutionFrame) -> Result<Instance, ResolveErrorKind> {
        let (dependencies, instantiator) = match &binding.provider {
            Provider::Instance(instance) => return Ok(instance.clone()),
            Provider::Constructor {
                dependencies,
                instantiator,
            }
            | Provider::Factory {
                dependencies,
                instantiator,
            } => (dependencies, instantiator),
        };

        frame.push(binding.key);
        let result = self
            .resolve_dependencies(dependencies, frame)
            .and_then(|resolved| Self::instantiate(binding, instantiator, resolved));
        frame.pop();

        result
    }

    fn instantiate(
        binding: &BindingDescriptor,
        instantiator: &BoxedInstantiator,
        resolved: Vec<(ContractKey, Instance)>,
    ) -> Result<Instance, ResolveErrorKind> {
        match instantiator.call(Dependencies::new(resolved)) {
            Ok(instance) => {
                debug!("Constructed");
                Ok(instance)
            }
            Err(InstantiatorErrorKind::Deps(err)) => {
                error!("{}", err);
                Err(err)
            }
            Err(InstantiatorErrorKind::Factory(err)) => {
                let err = ResolveErrorKind::Instantiate {
                    key: binding.key,
                    source: Box::new(err),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    fn resolve_dependencies(
        &self,
        dependencies: &[ContractKey],
        frame: &mut ResolutionFrame,
    ) -> Result<Vec<(ContractKey, Instance)>, ResolveErrorKind> {
        let mut resolved = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            resolved.push((*dependency, self.resolve(dependency, frame)?));
        }
        Ok(resolved)
    }
}
