use alloc::collections::BTreeMap;
use parking_lot::{ReentrantMutex, RwLock};
use tracing::debug;

use crate::{any::Instance, key::ContractKey};

/// Singleton instances of one injector.
///
/// Lookups only take the read lock. First-time construction runs under a
/// single re-entrant lock, so a key is constructed at most once even when
/// several threads ask for it together, while a singleton's own construction
/// can still resolve other singletons on the same thread.
#[derive(Default)]
pub(crate) struct SingletonCache {
    instances: RwLock<BTreeMap<ContractKey, Instance>>,
    construction: ReentrantMutex<()>,
}

impl SingletonCache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub(crate) fn get(&self, key: &ContractKey) -> Option<Instance> {
        self.instances.read().get(key).cloned()
    }

    /// Returns the cached instance or constructs, caches and returns a new one.
    /// A failed construction caches nothing.
    pub(crate) fn get_or_construct<E>(&self, key: &ContractKey, construct: impl FnOnce() -> Result<Instance, E>) -> Result<Instance, E> {
        if let Some(instance) = self.get(key) {
            debug!("Found in cache");
            return Ok(instance);
        }

        let _guard = self.construction.lock();
        if let Some(instance) = self.get(key) {
            debug!("Constructed while waiting for the lock");
            return Ok(instance);
        }
        debug!("Not found in cache");

        let instance = construct()?;
        self.instances.write().insert(*key, instance.clone());
        debug!("Cached");

        Ok(instance)
    }

    #[inline]
    #[must_use]
    #[cfg(test)]
    pub(crate) fn contains(&self, key: &ContractKey) -> bool {
        self.instances.read().contains_key(key)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.instances.read().len()
    }
}
