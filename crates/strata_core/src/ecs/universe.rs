//! # Universe
//!
//! The single owner of all state: entity ids, component storages, event
//! listeners and pending actions. Systems and actions receive it as
//! `&mut Universe` instead of holding a reference to it.

use crate::action::{ActionContext, ActionQueue};
use crate::config::EcsConfig;
use crate::error::EcsResult;
use crate::event::{EntityCreated, EntityRemoved, EventBus};

use super::component::Component;
use super::entity::{Entity, EntityRegistry};
use super::registry::ComponentRegistry;
use super::storage::{ComponentHandle, ComponentStorage};

/// Container for entities, components, listeners and deferred mutations.
///
/// # Immediate vs deferred
///
/// Every structural mutation comes in two flavors. The immediate one applies
/// now and publishes its event before returning. The `_deferred` one is
/// queued and applied by the next [`drain_actions`](Self::drain_actions),
/// which the cycle driver runs at the start of every cycle.
///
/// # Example
///
/// ```rust
/// use strata_core::{Component, Universe};
///
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut universe = Universe::default();
/// let entity = universe.create_entity().unwrap();
///
/// universe.attach_component_deferred(entity, Health(10));
/// assert!(!universe.has_component::<Health>(entity));
///
/// universe.drain_actions().unwrap();
/// assert_eq!(universe.component::<Health>(entity).map(|h| h.0), Some(10));
/// ```
pub struct Universe {
    config: EcsConfig,
    entities: EntityRegistry,
    components: ComponentRegistry,
    events: EventBus,
    actions: ActionQueue<Universe>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::build(EcsConfig::default())
    }
}

impl ActionContext for Universe {
    fn action_queue(&mut self) -> &mut ActionQueue<Self> {
        &mut self.actions
    }
}

impl Universe {
    /// Creates a universe from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`](crate::EcsError::InvalidConfig) if
    /// the configuration does not validate.
    pub fn new(config: EcsConfig) -> EcsResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EcsConfig) -> Self {
        tracing::info!(
            "Creating universe for {} entities (drain limit: {:?})",
            config.max_entities,
            config.max_actions_per_drain
        );

        Self {
            entities: EntityRegistry::with_config(&config),
            components: ComponentRegistry::new(config.max_entities as usize),
            events: EventBus::new(),
            actions: ActionQueue::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }

    /// Returns the entity registry.
    #[inline]
    #[must_use]
    pub const fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Returns the component registry.
    #[inline]
    #[must_use]
    pub const fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Returns the event bus.
    #[inline]
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the event bus mutably, to subscribe or publish custom events.
    #[inline]
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity and publishes [`EntityCreated`].
    ///
    /// # Returns
    ///
    /// [`Entity::NULL`] once the id space is exhausted. Nothing is published
    /// in that case.
    ///
    /// # Errors
    ///
    /// Returns a listener error. The entity exists regardless.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.create();
        if !entity.is_null() {
            self.events.publish(&EntityCreated { entity })?;
        }
        Ok(entity)
    }

    /// Destroys an entity.
    ///
    /// Detaches every component first, publishing one detach event per
    /// component, then publishes [`EntityRemoved`].
    ///
    /// # Returns
    ///
    /// `false` if the entity was not alive.
    ///
    /// # Errors
    ///
    /// Returns the first listener error. If it came from a detach event, the
    /// entity is still alive and may keep some of its components.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<bool> {
        if !self.entities.is_alive(entity) {
            return Ok(false);
        }

        let detached = self.components.remove_all(&mut self.events, entity)?;
        self.entities.destroy(entity);
        tracing::debug!("Destroyed entity {} ({} components)", entity, detached);

        self.events.publish(&EntityRemoved { entity })?;
        Ok(true)
    }

    /// Queues [`destroy_entity`](Self::destroy_entity) for the next drain.
    pub fn destroy_entity_deferred(&mut self, entity: Entity) {
        self.actions
            .push(move |universe: &mut Self| universe.destroy_entity(entity).map(drop));
    }

    /// Checks whether the id was ever issued.
    #[inline]
    #[must_use]
    pub fn is_valid_entity(&self, entity: Entity) -> bool {
        self.entities.is_valid(entity)
    }

    /// Checks whether the entity is currently alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Calls `callback` for every live entity, in ascending id order.
    pub fn each_entity<F>(&self, callback: F)
    where
        F: FnMut(Entity),
    {
        self.entities.iter_alive().for_each(callback);
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches a component now.
    ///
    /// # Returns
    ///
    /// `None` if the entity already holds a `T` or is not alive.
    ///
    /// # Errors
    ///
    /// Returns a listener error. The component stays attached.
    pub fn attach_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> EcsResult<Option<ComponentHandle<T>>> {
        if !self.entities.is_alive(entity) {
            tracing::debug!(
                "Skipping attach of {} to dead entity {}",
                std::any::type_name::<T>(),
                entity
            );
            return Ok(None);
        }
        self.components.attach(&mut self.events, entity, component)
    }

    /// Queues an attach for the next drain.
    ///
    /// Liveness is checked when the action runs, not now.
    pub fn attach_component_deferred<T: Component>(&mut self, entity: Entity, component: T) {
        self.actions.push(move |universe: &mut Self| {
            universe.attach_component(entity, component).map(drop)
        });
    }

    /// Detaches the `T` component of an entity now.
    ///
    /// # Returns
    ///
    /// `false` if the entity held no `T` or is not alive.
    ///
    /// # Errors
    ///
    /// Returns a listener error. The component stays detached.
    pub fn detach_component<T: Component>(&mut self, entity: Entity) -> EcsResult<bool> {
        if !self.entities.is_alive(entity) {
            tracing::debug!(
                "Skipping detach of {} from dead entity {}",
                std::any::type_name::<T>(),
                entity
            );
            return Ok(false);
        }
        self.components.detach::<T>(&mut self.events, entity)
    }

    /// Queues a detach for the next drain.
    pub fn detach_component_deferred<T: Component>(&mut self, entity: Entity) {
        self.actions.push(move |universe: &mut Self| {
            universe.detach_component::<T>(entity).map(drop)
        });
    }

    /// Checks whether an entity holds a `T`.
    #[must_use]
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.components.has::<T>(entity)
    }

    /// Gets the `T` component of an entity.
    #[must_use]
    pub fn component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.components.get(entity)
    }

    /// Gets the `T` component of an entity mutably.
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(entity)
    }

    /// Returns a handle to the `T` component of an entity.
    #[must_use]
    pub fn handle<T: Component>(&self, entity: Entity) -> Option<ComponentHandle<T>> {
        self.components.handle(entity)
    }

    /// Resolves a handle, or `None` if it went stale.
    #[must_use]
    pub fn resolve<T: Component>(&self, handle: ComponentHandle<T>) -> Option<&T> {
        self.components.storage::<T>()?.resolve(handle)
    }

    /// Resolves a handle mutably, or `None` if it went stale.
    pub fn resolve_mut<T: Component>(&mut self, handle: ComponentHandle<T>) -> Option<&mut T> {
        self.components.existing_storage_mut::<T>()?.resolve_mut(handle)
    }

    /// Returns the storage for `T`, if any `T` was ever attached.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.components.storage()
    }

    /// Calls `callback` for every live `T`, in storage order.
    ///
    /// Storage order is attach order until the first detach swaps the last
    /// component into the freed slot.
    pub fn each_component<T, F>(&self, callback: F)
    where
        T: Component,
        F: FnMut(&T, Entity),
    {
        if let Some(storage) = self.components.storage::<T>() {
            storage.for_each(callback);
        }
    }

    /// Calls `callback` for every live `T` mutably, in storage order.
    pub fn each_component_mut<T, F>(&mut self, callback: F)
    where
        T: Component,
        F: FnMut(&mut T, Entity),
    {
        if let Some(storage) = self.components.existing_storage_mut::<T>() {
            storage.for_each_mut(callback);
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Queues an arbitrary mutation for the next drain.
    pub fn defer<F>(&mut self, run: F)
    where
        F: FnOnce(&mut Self) -> EcsResult<()> + 'static,
    {
        self.actions.push(run);
    }

    /// Runs every pending action, including ones enqueued while draining.
    ///
    /// # Returns
    ///
    /// The number of actions executed.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DrainLimitExceeded`](crate::EcsError::DrainLimitExceeded)
    /// when the configured cap is hit, or the first action error.
    pub fn drain_actions(&mut self) -> EcsResult<usize> {
        let limit = self.config.max_actions_per_drain;
        ActionQueue::drain(self, limit)
    }

    /// Returns the number of pending actions.
    #[inline]
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.actions.len()
    }

    /// Discards every pending action.
    ///
    /// # Returns
    ///
    /// The number of actions discarded.
    pub fn clear_actions(&mut self) -> usize {
        self.actions.clear()
    }

    /// Resets entities, components and pending actions.
    ///
    /// Listeners survive, and no events are published for what is dropped.
    /// Entity ids start from zero again, so old ids become live again once
    /// reissued.
    pub fn recreate(&mut self) {
        let discarded = self.actions.clear();
        self.components.clear();
        self.entities.clear();
        tracing::info!("Universe recreated ({} pending actions discarded)", discarded);
    }
}
