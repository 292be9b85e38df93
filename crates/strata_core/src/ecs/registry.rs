//! # Component Registry
//!
//! Owns one [`ComponentStorage`] per component type, keyed by
//! [`ComponentType`]. Storages are created on first use and never dropped
//! before the registry itself.
//!
//! Every successful attach or detach publishes an event on the [`EventBus`]
//! handed in by the caller. The mutation has already happened when listeners
//! run, so a listener error is reported to the caller but never rolls the
//! storage back.

use std::any::Any;
use std::collections::HashMap;

use crate::error::EcsResult;
use crate::event::{ComponentAttached, ComponentDetached, EventBus};

use super::component::{Component, ComponentType};
use super::entity::Entity;
use super::storage::{ComponentHandle, ComponentStorage};

/// Type-erased view of a storage, for operations that do not need `T`.
trait ErasedStorage {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn has(&self, entity: Entity) -> bool;
    fn detach(&mut self, entity: Entity) -> bool;
    fn count(&self) -> usize;
    fn clear(&mut self);
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn has(&self, entity: Entity) -> bool {
        ComponentStorage::has(self, entity)
    }

    fn detach(&mut self, entity: Entity) -> bool {
        ComponentStorage::detach(self, entity)
    }

    fn count(&self) -> usize {
        ComponentStorage::count(self)
    }

    fn clear(&mut self) {
        ComponentStorage::clear(self);
    }
}

/// Maps component types to their storages.
pub struct ComponentRegistry {
    /// Storages by component type.
    storages: HashMap<ComponentType, Box<dyn ErasedStorage>>,
    /// Component types in first-use order, so cascades are deterministic.
    order: Vec<ComponentType>,
    /// Capacity given to every new storage.
    capacity: usize,
}

impl ComponentRegistry {
    /// Creates an empty registry whose storages hold up to `capacity` components.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            storages: HashMap::new(),
            order: Vec::new(),
            capacity,
        }
    }

    /// Returns the capacity of every storage.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of storages created so far.
    #[inline]
    #[must_use]
    pub fn storage_count(&self) -> usize {
        self.order.len()
    }

    /// Returns the registered component types in first-use order.
    #[must_use]
    pub fn component_types(&self) -> &[ComponentType] {
        &self.order
    }

    /// Returns the storage for `T`, if one was created.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&ComponentType::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<ComponentStorage<T>>())
    }

    /// Returns the storage for `T`, creating it on first use.
    pub fn storage_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        let component = ComponentType::of::<T>();
        let capacity = self.capacity;
        let order = &mut self.order;

        let storage = self.storages.entry(component).or_insert_with(|| {
            tracing::debug!("Creating storage for {}", component);
            order.push(component);
            Box::new(ComponentStorage::<T>::new(capacity))
        });

        match storage.as_any_mut().downcast_mut::<ComponentStorage<T>>() {
            Some(storage) => storage,
            None => unreachable!("storage for {component} registered under a foreign type"),
        }
    }

    /// Returns the storage for `T` mutably, without creating it.
    pub fn existing_storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&ComponentType::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    /// Attaches a component and publishes [`ComponentAttached`].
    ///
    /// # Returns
    ///
    /// A handle to the new component, or `None` if the entity already held a
    /// `T` (nothing is published in that case).
    ///
    /// # Errors
    ///
    /// Returns a listener error from the attach event. The component stays
    /// attached.
    pub fn attach<T: Component>(
        &mut self,
        events: &mut EventBus,
        entity: Entity,
        component: T,
    ) -> EcsResult<Option<ComponentHandle<T>>> {
        let Some(handle) = self.storage_mut::<T>().attach(entity, component) else {
            return Ok(None);
        };

        events.publish(&ComponentAttached::new(handle))?;
        Ok(Some(handle))
    }

    /// Detaches the `T` component of an entity and publishes
    /// [`ComponentDetached`].
    ///
    /// # Returns
    ///
    /// `false` if the entity held no `T`.
    ///
    /// # Errors
    ///
    /// Returns a listener error from the detach event. The component stays
    /// detached.
    pub fn detach<T: Component>(&mut self, events: &mut EventBus, entity: Entity) -> EcsResult<bool> {
        if !self.storage_mut::<T>().detach(entity) {
            return Ok(false);
        }

        events.publish(&ComponentDetached {
            entity,
            component: ComponentType::of::<T>(),
        })?;
        Ok(true)
    }

    /// Detaches a component given only its type tag.
    ///
    /// Unlike [`detach`](Self::detach), no storage is created for an unknown
    /// type.
    ///
    /// # Errors
    ///
    /// Returns a listener error from the detach event.
    pub fn detach_type(
        &mut self,
        events: &mut EventBus,
        entity: Entity,
        component: ComponentType,
    ) -> EcsResult<bool> {
        let detached = self
            .storages
            .get_mut(&component)
            .is_some_and(|storage| storage.detach(entity));
        if !detached {
            return Ok(false);
        }

        events.publish(&ComponentDetached { entity, component })?;
        Ok(true)
    }

    /// Detaches every component of an entity, in storage creation order.
    ///
    /// # Returns
    ///
    /// The number of components detached.
    ///
    /// # Errors
    ///
    /// Stops at the first listener error; components of later types stay
    /// attached.
    pub fn remove_all(&mut self, events: &mut EventBus, entity: Entity) -> EcsResult<usize> {
        let mut removed = 0;
        let mut index = 0;
        while let Some(&component) = self.order.get(index) {
            if self.detach_type(events, entity, component)? {
                removed += 1;
            }
            index += 1;
        }
        Ok(removed)
    }

    /// Returns a handle to the `T` component of an entity.
    #[must_use]
    pub fn handle<T: Component>(&self, entity: Entity) -> Option<ComponentHandle<T>> {
        self.storage::<T>()?.handle(entity)
    }

    /// Gets the `T` component of an entity.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Gets the `T` component of an entity mutably.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.existing_storage_mut::<T>()?.get_mut(entity)
    }

    /// Checks whether an entity holds a `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.has_type(entity, ComponentType::of::<T>())
    }

    /// Checks whether an entity holds a component of the given type.
    #[must_use]
    pub fn has_type(&self, entity: Entity, component: ComponentType) -> bool {
        self.storages
            .get(&component)
            .is_some_and(|storage| storage.has(entity))
    }

    /// Returns the number of live components of the given type.
    #[must_use]
    pub fn count_of(&self, component: ComponentType) -> usize {
        self.storages.get(&component).map_or(0, |storage| storage.count())
    }

    /// Empties every storage. Storages stay registered.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
    }
}
