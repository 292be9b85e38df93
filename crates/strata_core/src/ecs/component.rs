//! # Component Types
//!
//! Components are pure data containers with no behavior. Each component type
//! gets a process-wide tag derived from its [`TypeId`], which is how the
//! registry finds the storage for a type.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for ECS components.
///
/// Any `'static` data record can be a component:
///
/// ```rust
/// use strata_core::Component;
///
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {}
/// ```
pub trait Component: 'static {}

/// Runtime tag identifying a component type.
///
/// Two different component types never share a tag.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Returns the tag for `T`.
    #[inline]
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> TypeId {
        self.id
    }

    /// Returns the type name, for diagnostics only.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Checks whether this tag belongs to `T`.
    #[inline]
    #[must_use]
    pub fn is<T: Component>(self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(#[allow(dead_code)] u32);
    impl Component for Health {}

    struct Mana(#[allow(dead_code)] u32);
    impl Component for Mana {}

    #[test]
    fn test_tags_are_distinct_per_type() {
        assert_eq!(ComponentType::of::<Health>(), ComponentType::of::<Health>());
        assert_ne!(ComponentType::of::<Health>(), ComponentType::of::<Mana>());
        assert!(ComponentType::of::<Mana>().is::<Mana>());
        assert!(!ComponentType::of::<Mana>().is::<Health>());
    }

    #[test]
    fn test_name_is_type_name() {
        assert!(ComponentType::of::<Health>().name().ends_with("Health"));
    }
}
