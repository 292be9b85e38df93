//! # Structural Events
//!
//! Events published by the core whenever an entity or component changes.
//! Each one is created at the moment of the mutation and dropped as soon as
//! every listener has seen it.

use crate::ecs::{Component, ComponentHandle, ComponentType, Entity};

use super::bus::Event;

/// An entity was created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityCreated {
    /// The new entity.
    pub entity: Entity,
}

impl Event for EntityCreated {}

/// An entity was destroyed.
///
/// Published after all of its components have been detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityRemoved {
    /// The destroyed entity.
    pub entity: Entity,
}

impl Event for EntityRemoved {}

/// A component was attached to an entity.
///
/// One event type covers every component type, so a single listener can
/// observe all attaches. Use [`handle`](Self::handle) to recover a typed handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentAttached {
    /// Entity that received the component.
    pub entity: Entity,
    /// Type of the attached component.
    pub component: ComponentType,
    /// Dense slot the component was stored in.
    pub slot: usize,
}

impl Event for ComponentAttached {}

impl ComponentAttached {
    pub(crate) fn new<T: Component>(handle: ComponentHandle<T>) -> Self {
        Self {
            entity: handle.entity(),
            component: ComponentType::of::<T>(),
            slot: handle.slot(),
        }
    }

    /// Returns a typed handle if the attached component is a `T`.
    ///
    /// Like any handle, it goes stale on the next detach in that storage.
    #[must_use]
    pub fn handle<T: Component>(&self) -> Option<ComponentHandle<T>> {
        self.component
            .is::<T>()
            .then_some(ComponentHandle::new(self.entity, self.slot))
    }
}

/// A component was detached from an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentDetached {
    /// Entity that lost the component.
    pub entity: Entity,
    /// Type of the detached component.
    pub component: ComponentType,
}

impl Event for ComponentDetached {}
