use alloc::{boxed::Box, collections::BTreeSet, sync::Arc, vec::Vec};
use core::any::Any as _;
use tracing::{debug, error, info, info_span};

use crate::{
    any::Instance,
    binding::BindingDescriptor,
    cache::SingletonCache,
    errors::{CreateError, CreateErrorKind, ResolveErrorKind},
    frame::ResolutionFrame,
    key::{ContractKey, Qualifier},
    module::Module,
    registry::{BindingRegistry, FrozenRegistry},
    resolver::Resolver,
    stage::{decide, CallSite, Decision, Stage},
    validation,
};

/// Immutable, queryable realization of a validated binding graph.
///
/// Cloning is cheap: clones share the bindings and the singleton cache.
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    stage: Stage,
    registry: FrozenRegistry,
    cache: SingletonCache,
}

impl Injector {
    #[inline]
    #[must_use]
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    #[inline]
    #[must_use]
    fn new(stage: Stage, registry: FrozenRegistry) -> Self {
        Self {
            inner: Arc::new(InjectorInner {
                stage,
                registry,
                cache: SingletonCache::new(),
            }),
        }
    }

    #[inline]
    fn resolver(&self) -> Resolver<'_> {
        Resolver {
            registry: &self.inner.registry,
            cache: &self.inner.cache,
            stage: self.inner.stage,
        }
    }

    /// Gets an instance of the unqualified binding of `T`.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::MissingBinding`] if `T` or one of its transitive dependencies isn't bound
    /// - Returns [`ResolveErrorKind::CircularDependency`] if `T` depends on itself
    /// - Returns [`ResolveErrorKind::Instantiate`] if a provider fails
    #[inline]
    pub fn get_instance<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_typed(&ContractKey::of::<T>())
    }

    /// Gets an instance of the binding of `T` qualified by `Q`.
    ///
    /// # Errors
    /// See [`Self::get_instance`]
    #[inline]
    pub fn get_instance_named<T: Send + Sync + 'static, Q: Qualifier>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_typed(&ContractKey::qualified::<T, Q>())
    }

    /// Gets an instance of the binding of `T` qualified by `name`.
    ///
    /// # Errors
    /// See [`Self::get_instance`]
    #[inline]
    pub fn get_instance_with_name<T: Send + Sync + 'static>(&self, name: &'static str) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_typed(&ContractKey::named::<T>(name))
    }

    /// Gets a type-erased instance by its key.
    ///
    /// # Errors
    /// See [`Self::get_instance`]
    pub fn get_instance_by_key(&self, key: &ContractKey) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("get_instance", key = %key, stage = %self.inner.stage);
        let _guard = span.enter();

        let mut frame = ResolutionFrame::new();
        let result = self.resolver().resolve(key, &mut frame);
        debug_assert!(frame.is_empty());
        result
    }

    fn get_typed<T: Send + Sync + 'static>(&self, key: &ContractKey) -> Result<Arc<T>, ResolveErrorKind> {
        self.get_instance_by_key(key)?.downcast::<T>().map_err(|instance| {
            let err = ResolveErrorKind::IncorrectType {
                expected: *key,
                actual: (*instance).type_id(),
            };
            error!("{}", err);
            err
        })
    }

    #[inline]
    #[must_use]
    pub fn has_binding(&self, key: &ContractKey) -> bool {
        self.inner.registry.contains(key)
    }

    #[inline]
    #[must_use]
    pub fn binding(&self, key: &ContractKey) -> Option<&BindingDescriptor> {
        self.inner.registry.get(key)
    }

    /// Every binding in registration order
    #[inline]
    pub fn bindings(&self) -> impl Iterator<Item = &BindingDescriptor> {
        self.inner.registry.iter()
    }

    #[inline]
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.inner.stage
    }

    /// Number of singletons constructed so far
    #[inline]
    #[must_use]
    pub fn cached_singletons(&self) -> usize {
        self.inner.cache.len()
    }
}

/// Composes modules into an [`Injector`].
#[derive(Default)]
pub struct InjectorBuilder {
    stage: Stage,
    modules: Vec<Box<dyn Module>>,
}

impl InjectorBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    #[inline]
    #[must_use]
    pub fn add_module<M: Module + 'static>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    #[inline]
    #[must_use]
    pub fn add_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Module>>,
    {
        self.modules.extend(modules);
        self
    }

    /// Builds the injector, reporting every problem found at once.
    ///
    /// Duplicate bindings are always errors. In [`Stage::Production`] the whole graph is also checked
    /// for missing bindings and cycles, and every singleton is constructed.
    ///
    /// # Errors
    /// Returns [`CreateError`] with every duplicate binding, and in production every missing binding,
    /// cycle and failed singleton construction.
    pub fn build(self) -> Result<Injector, CreateError> {
        let span = info_span!("build", stage = %self.stage);
        let _guard = span.enter();

        let mut registry = BindingRegistry::new();
        for module in &self.modules {
            registry.add_module(module.as_ref());
        }
        let (registry, duplicates) = registry.freeze();

        let mut errors: Vec<CreateErrorKind> = duplicates.into_iter().map(Into::into).collect();
        if self.stage == Stage::Production {
            errors.extend(validation::validate(&registry).into_iter().map(Into::into));
        }
        if !errors.is_empty() {
            let err = CreateError::new(errors);
            error!("{}", err);
            return Err(err);
        }

        let injector = Injector::new(self.stage, registry);

        let mut failed = BTreeSet::new();
        for binding in injector.inner.registry.singletons() {
            if decide(binding.scope(), self.stage, CallSite::Build) != Decision::Eager {
                continue;
            }
            if depends_on_failed(&injector.inner.registry, binding.key(), &failed, &mut BTreeSet::new()) {
                debug!(key = %binding.key(), "Skipped, a dependency failed to construct");
                failed.insert(*binding.key());
                continue;
            }

            let mut frame = ResolutionFrame::new();
            match injector.resolver().resolve(binding.key(), &mut frame) {
                Ok(_) => debug!(key = %binding.key(), "Eagerly constructed"),
                Err(err) => {
                    let reported = err.failed_key().is_some_and(|key| !failed.insert(*key));
                    failed.insert(*binding.key());
                    if !reported {
                        errors.push(err.into());
                    }
                }
            }
        }
        if !errors.is_empty() {
            let err = CreateError::new(errors);
            error!("{}", err);
            return Err(err);
        }

        info!(
            bindings = injector.inner.registry.len(),
            singletons = injector.inner.cache.len(),
            "Injector built"
        );

        Ok(injector)
    }
}

/// Whether `key` or one of its transitive dependencies already failed to construct
fn depends_on_failed(
    registry: &FrozenRegistry,
    key: &ContractKey,
    failed: &BTreeSet<ContractKey>,
    visited: &mut BTreeSet<ContractKey>,
) -> bool {
    if failed.contains(key) {
        return true;
    }
    if !visited.insert(*key) {
        return false;
    }

    registry.get(key).is_some_and(|binding| {
        binding
            .dependencies()
            .iter()
            .any(|dependency| depends_on_failed(registry, dependency, failed, visited))
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{Injector, InjectorBuilder};
    use crate::{
        errors::{BindingErrorKind, CreateErrorKind, InstantiateErrorKind},
        inject::{Inject, InjectNamed},
        key::{ContractKey, Qualifier},
        module::{Binder, Module},
        stage::Stage,
        ResolveErrorKind,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        sync::Arc,
        vec::Vec,
    };
    use core::sync::atomic::{AtomicUsize, Ordering};
    use parking_lot::Mutex;
    use std::{sync::Barrier, thread};
    use tracing::debug;
    use tracing_test::traced_test;

    struct Config(&'static str);
    struct Pool(Arc<Config>);
    struct Repository(Arc<Pool>);

    struct Replica;

    impl Qualifier for Replica {
        const NAME: &'static str = "replica";
    }

    fn storage_module(constructions: Arc<AtomicUsize>) -> impl Module {
        move |binder: &mut Binder| {
            binder.bind::<Config>().to_instance(Config("primary"));
            binder.bind::<Config>().qualified_by::<Replica>().to_instance(Config("replica"));
            binder.bind::<Pool>().as_singleton().to_factory({
                let constructions = constructions.clone();
                move |Inject(config): Inject<Config>| {
                    constructions.fetch_add(1, Ordering::SeqCst);

                    debug!("Call pool instantiator");
                    Ok(Pool(config))
                }
            });
            binder
                .bind::<Pool>()
                .named("replica")
                .as_singleton()
                .to_factory(|config: InjectNamed<Config, Replica>| Ok(Pool(config.into_inner())));
            binder
                .bind::<Repository>()
                .to_factory(|Inject(pool): Inject<Pool>| Ok(Repository(pool)));
        }
    }

    #[test]
    #[traced_test]
    fn test_singleton_identity() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let injector = InjectorBuilder::new().add_module(storage_module(constructions.clone())).build().unwrap();

        assert_eq!(constructions.load(Ordering::SeqCst), 0);

        let pool_1 = injector.get_instance::<Pool>().unwrap();
        let pool_2 = injector.clone().get_instance::<Pool>().unwrap();
        let repository_1 = injector.get_instance::<Repository>().unwrap();
        let repository_2 = injector.get_instance::<Repository>().unwrap();

        assert!(Arc::ptr_eq(&pool_1, &pool_2));
        assert!(!Arc::ptr_eq(&repository_1, &repository_2));
        assert!(Arc::ptr_eq(&repository_1.0, &repository_2.0));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert_eq!(injector.cached_singletons(), 1);
    }

    #[test]
    fn test_qualified_lookup() {
        let injector = InjectorBuilder::new()
            .add_module(storage_module(Arc::new(AtomicUsize::new(0))))
            .build()
            .unwrap();

        let primary = injector.get_instance::<Pool>().unwrap();
        let replica = injector.get_instance_with_name::<Pool>("replica").unwrap();
        let replica_config = injector.get_instance_named::<Config, Replica>().unwrap();

        assert_eq!(primary.0 .0, "primary");
        assert_eq!(replica.0 .0, "replica");
        assert!(Arc::ptr_eq(&replica.0, &replica_config));
        assert!(!Arc::ptr_eq(&primary, &replica));
    }

    #[test]
    #[traced_test]
    fn test_production_constructs_singletons_eagerly() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let injector = Injector::builder()
            .stage(Stage::Production)
            .add_module(storage_module(constructions.clone()))
            .build()
            .unwrap();

        assert_eq!(injector.stage(), Stage::Production);
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert_eq!(injector.cached_singletons(), 2);

        let _ = injector.get_instance::<Pool>().unwrap();
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(logs_contain("Eagerly constructed"));
    }

    #[test]
    fn test_introspection() {
        let injector = InjectorBuilder::new()
            .add_module(storage_module(Arc::new(AtomicUsize::new(0))))
            .build()
            .unwrap();

        let keys: Vec<_> = injector.bindings().map(|binding| *binding.key()).collect();
        assert_eq!(
            keys,
            [
                ContractKey::of::<Config>(),
                ContractKey::qualified::<Config, Replica>(),
                ContractKey::of::<Pool>(),
                ContractKey::named::<Pool>("replica"),
                ContractKey::of::<Repository>(),
            ]
        );
        assert!(injector.has_binding(&ContractKey::of::<Repository>()));
        assert!(!injector.has_binding(&ContractKey::named::<Repository>("replica")));
        assert_eq!(
            injector.binding(&ContractKey::of::<Repository>()).unwrap().dependencies(),
            [ContractKey::of::<Pool>()]
        );
        assert_eq!(injector.stage(), Stage::Development);
    }

    #[test]
    #[traced_test]
    fn test_duplicates_fail_in_every_stage() {
        for stage in [Stage::Development, Stage::Production] {
            let err = InjectorBuilder::new()
                .stage(stage)
                .add_module(storage_module(Arc::new(AtomicUsize::new(0))))
                .add_module(|binder: &mut Binder| {
                    binder.bind::<Config>().to_instance(Config("override"));
                })
                .build()
                .err()
                .unwrap();

            assert_eq!(err.len(), 1);
            assert!(matches!(
                &err.errors[0],
                CreateErrorKind::Binding(BindingErrorKind::Duplicate { key, .. }) if *key == ContractKey::of::<Config>()
            ));
        }
    }

    #[test]
    fn test_get_by_key() {
        let injector = InjectorBuilder::new()
            .add_module(storage_module(Arc::new(AtomicUsize::new(0))))
            .build()
            .unwrap();

        let instance = injector.get_instance_by_key(&ContractKey::of::<Repository>()).unwrap();
        assert!(instance.downcast::<Repository>().is_ok());

        assert!(matches!(
            injector.get_instance::<String>(),
            Err(ResolveErrorKind::MissingBinding { required_by: None, .. })
        ));
    }

    #[test]
    #[traced_test]
    fn test_provider_failure_in_production() {
        let err = InjectorBuilder::new()
            .stage(Stage::Production)
            .add_module(|binder: &mut Binder| {
                binder
                    .bind::<Pool>()
                    .as_singleton()
                    .to_factory(|| Err(InstantiateErrorKind::from(anyhow::anyhow!("database is down"))));
                binder
                    .bind::<Config>()
                    .as_singleton()
                    .to_factory(|| Err(InstantiateErrorKind::from(anyhow::anyhow!("config file is missing"))));
            })
            .build()
            .err()
            .unwrap();

        assert_eq!(err.len(), 2);
        assert!(err.to_string().contains("Provider for Pool failed: database is down"));
        assert!(err.to_string().contains("Provider for Config failed: config file is missing"));
    }

    #[test]
    #[traced_test]
    fn test_failed_singleton_reported_once() {
        fn pool_module(constructions: Arc<AtomicUsize>) -> impl Fn(&mut Binder) {
            move |binder: &mut Binder| {
                let constructions = constructions.clone();
                binder.bind::<Pool>().as_singleton().to_factory(move || {
                    constructions.fetch_add(1, Ordering::SeqCst);
                    Err::<Pool, _>(InstantiateErrorKind::from(anyhow::anyhow!("database is down")))
                });
            }
        }

        fn repository_module(binder: &mut Binder) {
            binder
                .bind::<Repository>()
                .as_singleton()
                .to_factory(|Inject(pool): Inject<Pool>| Ok(Repository(pool)));
        }

        for pool_first in [true, false] {
            let constructions = Arc::new(AtomicUsize::new(0));
            let builder = Injector::builder().stage(Stage::Production);
            let builder = if pool_first {
                builder.add_module(pool_module(constructions.clone())).add_module(repository_module)
            } else {
                builder.add_module(repository_module).add_module(pool_module(constructions.clone()))
            };

            let err = builder.build().err().unwrap();

            assert_eq!(err.len(), 1);
            assert_eq!(constructions.load(Ordering::SeqCst), 1);
            assert!(matches!(
                &err.errors[0],
                CreateErrorKind::Resolve(ResolveErrorKind::Instantiate { key, .. }) if *key == ContractKey::of::<Pool>()
            ));
        }
    }

    #[test]
    fn test_production_constructs_singletons_in_registration_order() {
        struct Z;
        struct X;
        struct Y;

        let order = Arc::new(Mutex::new(Vec::new()));
        let module = {
            let order = order.clone();
            move |binder: &mut Binder| {
                let (z, x, y) = (order.clone(), order.clone(), order.clone());
                binder.bind::<Z>().as_singleton().to_factory(move || {
                    z.lock().push("Z");
                    Ok(Z)
                });
                binder.bind::<Config>().to_instance(Config("primary"));
                binder.bind::<X>().as_singleton().to_factory(move || {
                    x.lock().push("X");
                    Ok(X)
                });
                binder.bind::<Y>().as_singleton().to_factory(move || {
                    y.lock().push("Y");
                    Ok(Y)
                });
            }
        };

        let injector = Injector::builder().stage(Stage::Production).add_module(module).build().unwrap();

        assert_eq!(*order.lock(), ["Z", "X", "Y"]);
        assert_eq!(injector.cached_singletons(), 3);
    }

    #[test]
    #[traced_test]
    fn test_concurrent_first_resolution() {
        const THREADS: usize = 16;

        let constructions = Arc::new(AtomicUsize::new(0));
        let injector = InjectorBuilder::new().add_module(storage_module(constructions.clone())).build().unwrap();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let injector = injector.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    injector.get_instance::<Repository>().unwrap().0.clone()
                })
            })
            .collect();
        let pools: Vec<Arc<Pool>> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert!(pools.iter().all(|pool| Arc::ptr_eq(pool, &pools[0])));
    }

    #[test]
    #[allow(dead_code)]
    fn test_thread_safe() {
        fn impl_bounds<T: Send + Sync + 'static>() {}

        impl_bounds::<Injector>();
    }
}
