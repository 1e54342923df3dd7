//! Stage-aware dependency injection.
//!
//! Modules declare bindings from contract keys to providers. An
//! [`InjectorBuilder`] composes them into an immutable [`Injector`] that
//! resolves keys to instances, caches singletons and detects duplicate
//! bindings, missing bindings and circular dependencies.
//!
//! ```rust
//! use bindery::{create_injector, Binder, Inject, Module};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, message: &str) -> String {
//!         format!("[console] {message}")
//!     }
//! }
//!
//! struct Service {
//!     logger: Arc<Box<dyn Logger>>,
//! }
//!
//! struct LoggingModule;
//!
//! impl Module for LoggingModule {
//!     fn configure(&self, binder: &mut Binder) {
//!         binder
//!             .bind::<Box<dyn Logger>>()
//!             .as_singleton()
//!             .to_factory(|| Ok(Box::new(ConsoleLogger) as Box<dyn Logger>));
//!     }
//! }
//!
//! let injector = create_injector([
//!     Box::new(LoggingModule) as Box<dyn Module>,
//!     Box::new(|binder: &mut Binder| {
//!         binder
//!             .bind::<Service>()
//!             .to_factory(|Inject(logger): Inject<Box<dyn Logger>>| Ok(Service { logger }));
//!     }),
//! ])
//! .unwrap();
//!
//! let first = injector.get_instance::<Service>().unwrap();
//! let second = injector.get_instance::<Service>().unwrap();
//!
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(&first.logger, &second.logger));
//! assert_eq!(first.logger.log("ready"), "[console] ready");
//! ```

#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod cache;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod frame;
pub(crate) mod inject;
pub(crate) mod injector;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod module;
pub(crate) mod registry;
pub(crate) mod resolver;
pub(crate) mod service;
pub(crate) mod stage;
pub(crate) mod validation;

use alloc::boxed::Box;

pub use any::{Instance, TypeInfo};
pub use binding::{BindingDescriptor, BindingScope, ProviderKind};
pub use dependency_resolver::{Dependencies, DependencyResolver};
pub use errors::{BindingErrorKind, CreateError, CreateErrorKind, InstantiateErrorKind, ParseStageErrorKind, ResolveErrorKind};
pub use inject::{Inject, InjectNamed};
pub use injector::{Injector, InjectorBuilder};
pub use instantiator::{Injectable, Instantiator};
pub use key::{ContractKey, Qualifier};
pub use module::{Binder, BindingBuilder, Module};
pub use stage::{decide, CallSite, Decision, Stage};

/// Creates an injector in [`Stage::Development`].
///
/// # Errors
/// See [`InjectorBuilder::build`]
#[inline]
pub fn create_injector<I>(modules: I) -> Result<Injector, CreateError>
where
    I: IntoIterator<Item = Box<dyn Module>>,
{
    create_injector_with_stage(Stage::Development, modules)
}

/// Creates an injector in the given stage.
///
/// # Errors
/// See [`InjectorBuilder::build`]
#[inline]
pub fn create_injector_with_stage<I>(stage: Stage, modules: I) -> Result<Injector, CreateError>
where
    I: IntoIterator<Item = Box<dyn Module>>,
{
    InjectorBuilder::new().stage(stage).add_modules(modules).build()
}
