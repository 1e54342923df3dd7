use alloc::string::ToString as _;
use core::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::{binding::BindingScope, errors::ParseStageErrorKind};

/// Policy for when singletons are constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    /// Singletons are constructed on first use. Build only checks for duplicate bindings.
    #[default]
    Development,
    /// The whole graph is validated and every singleton is constructed while building.
    Production,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Development => f.write_str("development"),
            Stage::Production => f.write_str("production"),
        }
    }
}

impl FromStr for Stage {
    type Err = ParseStageErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("development") || s.eq_ignore_ascii_case("dev") {
            Ok(Stage::Development)
        } else if s.eq_ignore_ascii_case("production") || s.eq_ignore_ascii_case("prod") {
            Ok(Stage::Production)
        } else {
            Err(ParseStageErrorKind::Unknown(s.to_string()))
        }
    }
}

/// Where an instance is being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallSite {
    /// While the injector is being built
    Build,
    /// From a lookup on a built injector
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Construct on first use, then reuse the cached instance
    Cached,
    /// Construct a new instance, never cache it
    Fresh,
    /// Construct and cache now
    Eager,
    /// Nothing to do
    Skip,
}

impl Decision {
    #[inline]
    #[must_use]
    pub const fn uses_cache(self) -> bool {
        matches!(self, Decision::Cached | Decision::Eager)
    }
}

/// | scope     | stage       | build | lookup |
/// |-----------|-------------|-------|--------|
/// | singleton | development | skip  | cached |
/// | singleton | production  | eager | cached |
/// | unscoped  | any         | skip  | fresh  |
#[inline]
#[must_use]
pub const fn decide(scope: BindingScope, stage: Stage, call_site: CallSite) -> Decision {
    match (scope, stage, call_site) {
        (BindingScope::Singleton, Stage::Production, CallSite::Build) => Decision::Eager,
        (BindingScope::Singleton, _, CallSite::Lookup) => Decision::Cached,
        (BindingScope::Unscoped, _, CallSite::Lookup) => Decision::Fresh,
        (_, _, CallSite::Build) => Decision::Skip,
    }
}
