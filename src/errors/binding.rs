use alloc::string::String;
use core::fmt::{self, Display, Formatter};

use crate::{any::short_type_name, key::ContractKey};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingErrorKind {
    #[error("Binding for {key} is already registered. First registered in `{}`, registered again in `{}`", ModuleName(first_source), ModuleName(second_source))]
    Duplicate {
        key: ContractKey,
        first_source: &'static str,
        second_source: &'static str,
    },
}

impl BindingErrorKind {
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &ContractKey {
        match self {
            BindingErrorKind::Duplicate { key, .. } => key,
        }
    }
}

/// Module name without its path. Closures keep the name of the function defining them.
struct ModuleName<'a>(&'a str);

const CLOSURE_SUFFIX: &str = "::{{closure}}";

impl Display for ModuleName<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut name = self.0;
        let mut closures = String::new();
        while let Some(stripped) = name.strip_suffix(CLOSURE_SUFFIX) {
            name = stripped;
            closures.push_str(CLOSURE_SUFFIX);
        }
        write!(f, "{}{closures}", short_type_name(name))
    }
}
