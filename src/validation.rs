use alloc::{collections::BTreeSet, vec::Vec};
use tracing::{debug, error};

use crate::{binding::BindingDescriptor, errors::ResolveErrorKind, key::ContractKey, registry::FrozenRegistry};

/// Walks every binding of the graph and reports each missing dependency and
/// each cycle once, in registration order.
#[must_use]
pub(crate) fn validate(registry: &FrozenRegistry) -> Vec<ResolveErrorKind> {
    let mut checked = BTreeSet::new();
    let mut errors = Vec::new();
    for binding in registry.iter() {
        let mut chain = Vec::new();
        check_recurse(registry, &mut checked, &mut errors, &mut chain, binding);
    }

    debug!(bindings = registry.len(), errors = errors.len(), "Graph validated");

    errors
}

fn check_recurse(
    registry: &FrozenRegistry,
    checked: &mut BTreeSet<ContractKey>,
    errors: &mut Vec<ResolveErrorKind>,
    chain: &mut Vec<ContractKey>,
    binding: &BindingDescriptor,
) {
    let key = *binding.key();

    if let Some(start) = chain.iter().position(|active| *active == key) {
        let mut path = chain[start..].to_vec();
        path.push(key);

        let err = ResolveErrorKind::CircularDependency { path };
        error!("{}", err);
        errors.push(err);
        return;
    }

    if !checked.insert(key) {
        return;
    }

    chain.push(key);
    for dependency in binding.dependencies() {
        match registry.get(dependency) {
            Some(next) => check_recurse(registry, checked, errors, chain, next),
            None => {
                let err = ResolveErrorKind::MissingBinding {
                    key: *dependency,
                    required_by: Some(key),
                };
                error!("{}", err);
                errors.push(err);
            }
        }
    }
    chain.pop();
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::validate;
    use crate::{
        errors::InstantiateErrorKind,
        inject::Inject,
        key::ContractKey,
        module::Binder,
        registry::{BindingRegistry, FrozenRegistry},
        ResolveErrorKind,
    };

    use alloc::{
        format,
        string::{String, ToString as _},
        vec,
    };
    use tracing_test::traced_test;

    struct A;
    struct B;
    struct C;
    struct D;

    fn registry(module: impl Fn(&mut Binder)) -> FrozenRegistry {
        let mut registry = BindingRegistry::new();
        registry.add_module(&module);
        registry.freeze().0
    }

    #[test]
    fn test_valid_graph() {
        let registry = registry(|binder: &mut Binder| {
            binder.bind::<A>().to_factory(|Inject(_): Inject<B>, Inject(_): Inject<C>| Ok(A));
            binder.bind::<B>().to_factory(|Inject(_): Inject<C>| Ok(B));
            binder.bind::<C>().to_instance(C);
        });

        assert!(validate(&registry).is_empty());
    }

    #[test]
    #[traced_test]
    fn test_every_missing_dependency_reported() {
        let registry = registry(|binder: &mut Binder| {
            binder.bind::<A>().to_factory(|Inject(_): Inject<B>, Inject(_): Inject<D>| Ok(A));
            binder.bind::<C>().to_factory(|Inject(_): Inject<D>| Ok(C));
        });

        let errors = validate(&registry);

        assert_eq!(errors.len(), 3);
        assert!(matches!(
            errors[0],
            ResolveErrorKind::MissingBinding { key, required_by: Some(required_by) }
                if key == ContractKey::of::<B>() && required_by == ContractKey::of::<A>()
        ));
        assert!(matches!(
            errors[2],
            ResolveErrorKind::MissingBinding { key, required_by: Some(required_by) }
                if key == ContractKey::of::<D>() && required_by == ContractKey::of::<C>()
        ));
        assert!(logs_contain("No binding registered for D"));
    }

    #[test]
    fn test_cycle_reported_once() {
        let registry = registry(|binder: &mut Binder| {
            binder.bind::<D>().to_factory(|Inject(_): Inject<A>| Ok(D));
            binder.bind::<A>().to_factory(|Inject(_): Inject<B>| Ok(A));
            binder
                .bind::<B>()
                .to_factory(|Inject(_): Inject<C>| Ok::<_, InstantiateErrorKind>(B));
            binder.bind::<C>().to_factory(|Inject(_): Inject<A>| Ok(C));
        });

        let errors = validate(&registry);

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].cycle_path(),
            Some(&[ContractKey::of::<A>(), ContractKey::of::<B>(), ContractKey::of::<C>(), ContractKey::of::<A>()][..])
        );
    }

    #[test]
    fn test_self_dependency() {
        let registry = registry(|binder: &mut Binder| {
            binder.bind::<A>().to_factory(|Inject(_): Inject<A>| Ok(A));
        });

        let errors = validate(&registry);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].cycle_path(), Some(&vec![ContractKey::of::<A>(), ContractKey::of::<A>()][..]));
    }
}
