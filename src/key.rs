use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Marker type naming a qualified binding, so typed code can refer to the
/// same key without repeating the string.
///
/// ```rust
/// use bindery::{ContractKey, Qualifier};
///
/// struct Primary;
///
/// impl Qualifier for Primary {
///     const NAME: &'static str = "primary";
/// }
///
/// assert_eq!(ContractKey::qualified::<u32, Primary>(), ContractKey::named::<u32>("primary"));
/// ```
pub trait Qualifier: 'static {
    const NAME: &'static str;
}

/// Lookup key of a binding: a type, optionally qualified by a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContractKey {
    type_info: TypeInfo,
    qualifier: Option<&'static str>,
}

impl ContractKey {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Some(name),
        }
    }

    #[inline]
    #[must_use]
    pub fn qualified<T: ?Sized + 'static, Q: Qualifier>() -> Self {
        Self::named::<T>(Q::NAME)
    }

    #[inline]
    #[must_use]
    pub const fn with_qualifier(self, name: &'static str) -> Self {
        Self {
            type_info: self.type_info,
            qualifier: Some(name),
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    #[inline]
    #[must_use]
    pub const fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }
}

impl Display for ContractKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_info.short_name())?;
        if let Some(qualifier) = self.qualifier {
            write!(f, "@{qualifier}")?;
        }
        Ok(())
    }
}
