use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

use super::{binding::BindingErrorKind, resolve::ResolveErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum CreateErrorKind {
    #[error(transparent)]
    Binding(#[from] BindingErrorKind),
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
}

/// Every problem found while building an injector.
#[derive(thiserror::Error, Debug)]
pub struct CreateError {
    pub errors: Vec<CreateErrorKind>,
}

impl CreateError {
    #[inline]
    #[must_use]
    pub(crate) const fn new(errors: Vec<CreateErrorKind>) -> Self {
        Self { errors }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &CreateErrorKind> {
        self.errors.iter()
    }
}

impl Display for CreateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Unable to create injector, {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n- {error}")?;
        }
        Ok(())
    }
}
