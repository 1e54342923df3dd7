mod binding;
mod create;
mod instantiate;
mod instantiator;
mod resolve;
mod stage;

pub use binding::BindingErrorKind;
pub use create::{CreateError, CreateErrorKind};
pub use instantiate::InstantiateErrorKind;
pub(crate) use instantiator::InstantiatorErrorKind;
pub use resolve::ResolveErrorKind;
pub use stage::ParseStageErrorKind;
