use alloc::{collections::VecDeque, sync::Arc, vec::Vec};
use core::any::Any as _;

use crate::{any::Instance, errors::ResolveErrorKind, key::ContractKey};

/// Declares the keys a provider depends on and rebuilds typed values from
/// their resolved instances.
///
/// Keys are resolved in the order [`DependencyResolver::keys`] returns them,
/// and handed back to [`DependencyResolver::resolve`] in the same order.
pub trait DependencyResolver: Sized {
    #[must_use]
    fn keys() -> Vec<ContractKey>;

    /// # Errors
    /// Returns [`ResolveErrorKind::IncorrectType`] if a resolved instance isn't of the declared type.
    fn resolve(dependencies: &mut Dependencies) -> Result<Self, ResolveErrorKind>;
}

/// Resolved dependency instances, in declaration order.
pub struct Dependencies {
    resolved: VecDeque<(ContractKey, Instance)>,
}

impl Dependencies {
    #[inline]
    #[must_use]
    pub(crate) fn new(resolved: Vec<(ContractKey, Instance)>) -> Self {
        Self {
            resolved: VecDeque::from(resolved),
        }
    }

    /// Takes the next resolved instance.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::MissingBinding`] if every instance is already taken
    /// - Returns [`ResolveErrorKind::IncorrectType`] if the instance isn't a `T`
    pub fn take<T: Send + Sync + 'static>(&mut self, key: &ContractKey) -> Result<Arc<T>, ResolveErrorKind> {
        let Some((resolved_key, instance)) = self.resolved.pop_front() else {
            return Err(ResolveErrorKind::MissingBinding {
                key: *key,
                required_by: None,
            });
        };

        instance.downcast::<T>().map_err(|instance| ResolveErrorKind::IncorrectType {
            expected: resolved_key,
            actual: (*instance).type_id(),
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            fn keys() -> Vec<ContractKey> {
                let mut keys = Vec::new();
                $( keys.extend($ty::keys()); )*
                keys
            }

            #[inline]
            #[allow(unused_variables)]
            fn resolve(dependencies: &mut Dependencies) -> Result<Self, ResolveErrorKind> {
                Ok(($($ty::resolve(dependencies)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
