use alloc::{string::String, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
};

/// Type-erased value produced by a binding.
pub type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Type name with every module path stripped, including generic arguments:
    /// `alloc::boxed::Box<dyn app::Logger>` becomes `Box<dyn Logger>`.
    #[inline]
    #[must_use]
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

#[must_use]
pub(crate) fn short_type_name(name: &str) -> String {
    let mut short = String::with_capacity(name.len());
    let mut segment_start = 0;
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ':' && chars.peek() == Some(&':') {
            chars.next();
            short.truncate(segment_start);
            continue;
        }
        short.push(ch);
        if !(ch.is_alphanumeric() || ch == '_') {
            segment_start = short.len();
        }
    }
    short
}
