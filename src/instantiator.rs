use alloc::sync::Arc;
use tracing::debug;

use crate::{
    any::Instance,
    dependency_resolver::{Dependencies, DependencyResolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    service::{service_fn, BoxedService},
};

/// Provider function building a value from its dependencies.
///
/// Implemented for closures whose arguments are all [`DependencyResolver`]s,
/// e.g. `|Inject(config): Inject<Config>| Ok(Pool::new(&config))`.
pub trait Instantiator<Deps>: Send + Sync + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn instantiate(&self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

/// Implementation type the injector can construct on its own.
///
/// ```rust
/// use bindery::{Inject, Injectable, InstantiateErrorKind};
///
/// struct Config;
/// struct Pool(std::sync::Arc<Config>);
///
/// impl Injectable for Pool {
///     type Dependencies = (Inject<Config>,);
///
///     fn construct((Inject(config),): Self::Dependencies) -> Result<Self, InstantiateErrorKind> {
///         Ok(Self(config))
///     }
/// }
/// ```
pub trait Injectable: Sized + 'static {
    type Dependencies: DependencyResolver;

    /// # Errors
    /// Returns an error if the value can't be built from the given dependencies.
    fn construct(dependencies: Self::Dependencies) -> Result<Self, InstantiateErrorKind>;
}

type InstantiatorResult = Result<Instance, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

pub(crate) type BoxedInstantiator = BoxedService<Dependencies, Instance, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

#[must_use]
pub(crate) fn boxed_factory<Inst, Deps>(instantiator: Inst) -> BoxedInstantiator
where
    Inst: Instantiator<Deps>,
    Inst::Provides: Send + Sync,
    Deps: DependencyResolver + 'static,
{
    Arc::new(service_fn(move |mut dependencies: Dependencies| -> InstantiatorResult {
        let dependencies = match Deps::resolve(&mut dependencies) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
        };
        let provides = match instantiator.instantiate(dependencies) {
            Ok(provides) => provides,
            Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
        };

        debug!("Instantiated by factory");

        Ok(Arc::new(provides) as Instance)
    }))
}

#[must_use]
pub(crate) fn boxed_constructor<Impl, Contract>() -> BoxedInstantiator
where
    Impl: Injectable + Into<Contract>,
    Contract: Send + Sync + 'static,
{
    Arc::new(service_fn(|mut dependencies: Dependencies| -> InstantiatorResult {
        let dependencies = match Impl::Dependencies::resolve(&mut dependencies) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
        };
        let provides: Contract = match Impl::construct(dependencies) {
            Ok(provides) => provides.into(),
            Err(err) => return Err(InstantiatorErrorKind::Factory(err)),
        };

        debug!("Instantiated by constructor");

        Ok(Arc::new(provides) as Instance)
    }))
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: Fn($($ty,)*) -> Result<Response, Err> + Send + Sync + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            #[inline]
            fn instantiate(&self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);
