//! # Component Storage
//!
//! Dense, swap-remove storage for a single component type (a sparse set).
//!
//! The storage keeps three arrays in lockstep:
//! - `dense`: the live component values, packed in `0..n`
//! - `owners`: slot -> entity, parallel to `dense`
//! - `sparse`: entity index -> slot, grown on demand
//!
//! Attach appends, detach moves the last value into the vacated slot. Both are
//! O(1) and the live range never has holes, at the cost of slot order changing
//! on every detach.

use std::fmt;
use std::marker::PhantomData;

use super::component::Component;
use super::entity::Entity;

/// Index-based reference to a component inside its storage.
///
/// A handle is only meaningful until the next structural change of the
/// storage it came from: a detach may move another component into its slot.
/// [`ComponentStorage::resolve`] re-checks the slot owner, so a stale handle
/// resolves to `None` instead of to another entity's data.
pub struct ComponentHandle<T> {
    entity: Entity,
    slot: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentHandle<T> {
    #[inline]
    pub(crate) const fn new(entity: Entity, slot: usize) -> Self {
        Self {
            entity,
            slot,
            _marker: PhantomData,
        }
    }

    /// Returns the entity the component belonged to when the handle was made.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns the dense slot the component occupied when the handle was made.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }
}

// Manual impls: the derives would require `T: Clone` etc.
impl<T> Clone for ComponentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentHandle<T> {}

impl<T> PartialEq for ComponentHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity && self.slot == other.slot
    }
}

impl<T> Eq for ComponentHandle<T> {}

impl<T> fmt::Debug for ComponentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("type", &std::any::type_name::<T>())
            .field("entity", &self.entity)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Storage for every live component of type `C`.
///
/// # Example
///
/// ```rust
/// use strata_core::{Component, ComponentStorage, Entity};
///
/// struct Health(u32);
/// impl Component for Health {}
///
/// let mut storage: ComponentStorage<Health> = ComponentStorage::new(16);
/// let e = Entity::from_raw(3);
/// assert!(storage.attach(e, Health(10)).is_some());
/// assert!(storage.attach(e, Health(99)).is_none()); // already present
/// assert_eq!(storage.get(e).map(|h| h.0), Some(10));
/// assert!(storage.detach(e));
/// ```
pub struct ComponentStorage<C: Component> {
    /// Live component values.
    dense: Vec<C>,
    /// Owner of each dense slot.
    owners: Vec<Entity>,
    /// Slot of each entity, indexed by entity id.
    sparse: Vec<Option<usize>>,
    /// Maximum number of live components.
    capacity: usize,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates an empty storage that can hold up to `capacity` components.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            sparse: Vec::new(),
            capacity,
        }
    }

    /// Returns the maximum number of live components.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of live components.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.dense.len()
    }

    /// Returns `true` if no component is stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    #[inline]
    fn slot_of(&self, entity: Entity) -> Option<usize> {
        if entity.is_null() {
            return None;
        }
        self.sparse.get(entity.index()).copied().flatten()
    }

    /// Checks whether `entity` holds a component of this type.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// Attaches a component to an entity.
    ///
    /// # Returns
    ///
    /// A handle to the stored value, or `None` if the entity already holds a
    /// component of this type. The existing value is left untouched and
    /// `value` is dropped.
    ///
    /// # Panics
    ///
    /// Panics if the storage is already at capacity, or if `entity` is null or
    /// not below the capacity. Each indicates corrupted bookkeeping upstream,
    /// since no entity id reaches the entity capacity.
    pub fn attach(&mut self, entity: Entity, value: C) -> Option<ComponentHandle<C>> {
        assert!(!entity.is_null(), "Cannot attach a component to Entity::NULL");
        if self.has(entity) {
            return None;
        }
        assert!(
            self.dense.len() < self.capacity,
            "There are more {} components than there can be entities",
            std::any::type_name::<C>()
        );
        assert!(
            entity.index() < self.capacity,
            "Entity {} is out of range for a storage of capacity {}",
            entity,
            self.capacity
        );

        let slot = self.dense.len();
        self.dense.push(value);
        self.owners.push(entity);

        let index = entity.index();
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }
        self.sparse[index] = Some(slot);

        Some(ComponentHandle::new(entity, slot))
    }

    /// Detaches the component of an entity and returns it.
    ///
    /// The last component is moved into the vacated slot.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let slot = self.slot_of(entity)?;

        let value = self.dense.swap_remove(slot);
        self.owners.swap_remove(slot);
        self.sparse[entity.index()] = None;

        // Re-point whichever entity got moved into the hole.
        if let Some(&moved) = self.owners.get(slot) {
            self.sparse[moved.index()] = Some(slot);
        }

        Some(value)
    }

    /// Detaches the component of an entity.
    ///
    /// # Returns
    ///
    /// `false` if the entity held no component of this type.
    pub fn detach(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    /// Returns a handle to the entity's component.
    #[must_use]
    pub fn handle(&self, entity: Entity) -> Option<ComponentHandle<C>> {
        self.slot_of(entity)
            .map(|slot| ComponentHandle::new(entity, slot))
    }

    /// Gets the component of an entity.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        let slot = self.slot_of(entity)?;
        self.dense.get(slot)
    }

    /// Gets the component of an entity mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let slot = self.slot_of(entity)?;
        self.dense.get_mut(slot)
    }

    /// Resolves a handle, returning `None` if the handle went stale.
    #[must_use]
    pub fn resolve(&self, handle: ComponentHandle<C>) -> Option<&C> {
        if self.owners.get(handle.slot) == Some(&handle.entity) {
            self.dense.get(handle.slot)
        } else {
            None
        }
    }

    /// Resolves a handle mutably, returning `None` if the handle went stale.
    pub fn resolve_mut(&mut self, handle: ComponentHandle<C>) -> Option<&mut C> {
        if self.owners.get(handle.slot) == Some(&handle.entity) {
            self.dense.get_mut(handle.slot)
        } else {
            None
        }
    }

    /// Calls `callback` for every live component, in slot order.
    ///
    /// Slot order is insertion order until the first detach.
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&C, Entity),
    {
        for (value, &entity) in self.dense.iter().zip(&self.owners) {
            callback(value, entity);
        }
    }

    /// Calls `callback` for every live component mutably, in slot order.
    pub fn for_each_mut<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut C, Entity),
    {
        for (value, &entity) in self.dense.iter_mut().zip(&self.owners) {
            callback(value, entity);
        }
    }

    /// Iterates over `(entity, component)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    /// Returns the entities owning a component, in slot order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.owners
    }

    /// Returns the packed component values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.dense
    }

    /// Returns the packed component values mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.dense
    }

    /// Drops every component and empties both index maps.
    pub fn clear(&mut self) {
        self.dense.clear();
        self.owners.clear();
        self.sparse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {}

    fn pos(x: f32) -> Position {
        Position { x, y: -x }
    }

    fn e(id: u32) -> Entity {
        Entity::from_raw(id)
    }

    /// Asserts that `owners` and `sparse` are exact inverses over the live range.
    fn assert_consistent<C: Component>(storage: &ComponentStorage<C>) {
        assert_eq!(storage.dense.len(), storage.owners.len());
        for (slot, owner) in storage.owners.iter().enumerate() {
            assert_eq!(storage.sparse[owner.index()], Some(slot));
        }
        let mapped = storage.sparse.iter().filter(|s| s.is_some()).count();
        assert_eq!(mapped, storage.count());
    }

    #[test]
    fn test_attach_get() {
        let mut storage = ComponentStorage::new(10);
        let handle = storage.attach(e(4), pos(1.0)).unwrap();

        assert_eq!(handle.entity(), e(4));
        assert_eq!(handle.slot(), 0);
        assert_eq!(storage.get(e(4)), Some(&pos(1.0)));
        assert_eq!(storage.resolve(handle), Some(&pos(1.0)));
        assert!(storage.has(e(4)));
        assert!(!storage.has(e(3)));
        assert_eq!(storage.count(), 1);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut storage = ComponentStorage::new(10);
        assert!(storage.attach(e(0), pos(1.0)).is_some());
        assert!(storage.attach(e(0), pos(2.0)).is_none());

        assert_eq!(storage.count(), 1);
        assert_eq!(storage.get(e(0)), Some(&pos(1.0)));
    }

    #[test]
    fn test_attach_detach_inverse() {
        let mut storage = ComponentStorage::new(10);
        storage.attach(e(0), pos(0.0));
        let before = storage.count();

        storage.attach(e(1), pos(1.0));
        assert!(storage.detach(e(1)));

        assert!(!storage.has(e(1)));
        assert_eq!(storage.count(), before);
        assert_consistent(&storage);
    }

    #[test]
    fn test_detach_missing() {
        let mut storage: ComponentStorage<Position> = ComponentStorage::new(10);
        assert!(!storage.detach(e(0)));
        assert!(!storage.detach(Entity::NULL));

        storage.attach(e(1), pos(1.0));
        assert!(!storage.detach(e(0)));
        assert_eq!(storage.count(), 1);
    }

    #[test]
    fn test_swap_remove_keeps_other_values() {
        let mut storage = ComponentStorage::new(10);
        for id in 0..5 {
            storage.attach(e(id), pos(id as f32));
        }

        assert!(storage.detach(e(1)));

        for id in [0, 2, 3, 4] {
            assert_eq!(storage.get(e(id)), Some(&pos(id as f32)));
        }
        // The last component moved into the vacated slot.
        assert_eq!(storage.entities(), &[e(0), e(4), e(2), e(3)]);
        assert_consistent(&storage);
    }

    #[test]
    fn test_detach_last_slot() {
        let mut storage = ComponentStorage::new(10);
        storage.attach(e(0), pos(0.0));
        storage.attach(e(1), pos(1.0));

        assert_eq!(storage.remove(e(1)), Some(pos(1.0)));
        assert_eq!(storage.entities(), &[e(0)]);
        assert_consistent(&storage);

        assert_eq!(storage.remove(e(0)), Some(pos(0.0)));
        assert!(storage.is_empty());
        assert_consistent(&storage);
    }

    #[test]
    fn test_stale_handle_resolves_to_none() {
        let mut storage = ComponentStorage::new(10);
        let first = storage.attach(e(0), pos(0.0)).unwrap();
        let last = storage.attach(e(1), pos(1.0)).unwrap();

        storage.detach(e(0));

        // e(1) now sits in slot 0: the old handle for e(0) must not alias it.
        assert_eq!(storage.resolve(first), None);
        assert_eq!(storage.resolve(last), None);

        let fresh = storage.handle(e(1)).unwrap();
        assert_eq!(fresh.slot(), 0);
        assert_eq!(storage.resolve(fresh), Some(&pos(1.0)));
    }

    #[test]
    fn test_resolve_mut_writes_through() {
        let mut storage = ComponentStorage::new(4);
        let handle = storage.attach(e(2), pos(1.0)).unwrap();
        storage.resolve_mut(handle).unwrap().x = 7.0;
        assert!((storage.get(e(2)).unwrap().x - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_for_each_visits_all() {
        let mut storage = ComponentStorage::new(10);
        for id in [3, 7, 1] {
            storage.attach(e(id), pos(id as f32));
        }

        let mut seen = Vec::new();
        storage.for_each(|value, entity| seen.push((entity, value.x)));
        assert_eq!(seen, vec![(e(3), 3.0), (e(7), 7.0), (e(1), 1.0)]);

        storage.for_each_mut(|value, _| value.y = 0.0);
        assert!(storage.iter().all(|(_, value)| value.y == 0.0));
    }

    #[test]
    fn test_clear() {
        let mut storage = ComponentStorage::new(10);
        storage.attach(e(0), pos(0.0));
        storage.attach(e(5), pos(5.0));
        storage.clear();

        assert_eq!(storage.count(), 0);
        assert!(!storage.has(e(5)));
        assert!(storage.attach(e(5), pos(5.0)).is_some());
    }

    #[test]
    fn test_fill_to_capacity() {
        let mut storage = ComponentStorage::new(3);
        for id in 0..3 {
            assert!(storage.attach(e(id), pos(0.0)).is_some());
        }
        assert_eq!(storage.count(), storage.capacity());
    }

    #[test]
    #[should_panic(expected = "more")]
    fn test_overflow_is_fatal() {
        let mut storage = ComponentStorage::new(2);
        storage.attach(e(0), pos(0.0));
        storage.attach(e(1), pos(0.0));
        storage.attach(e(2), pos(0.0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_entity_beyond_capacity_is_fatal() {
        let mut storage = ComponentStorage::new(4);
        storage.attach(e(20_000_000), pos(0.0));
    }

    #[test]
    fn test_highest_entity_in_range() {
        let mut storage = ComponentStorage::new(4);
        assert!(storage.attach(e(3), pos(3.0)).is_some());
        assert_eq!(storage.sparse.len(), 4);
        assert_consistent(&storage);
    }

    #[test]
    fn test_randomized_churn_stays_consistent() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        const ENTITIES: u32 = 64;

        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut storage = ComponentStorage::new(ENTITIES as usize);
        let mut model: Vec<Option<f32>> = vec![None; ENTITIES as usize];

        for step in 0..5_000 {
            let id = rng.gen_range(0..ENTITIES);
            let entity = e(id);
            if rng.gen_bool(0.55) {
                let value = step as f32;
                let attached = storage.attach(entity, pos(value)).is_some();
                assert_eq!(attached, model[id as usize].is_none());
                model[id as usize].get_or_insert(value);
            } else {
                let detached = storage.detach(entity);
                assert_eq!(detached, model[id as usize].take().is_some());
            }
        }

        assert_consistent(&storage);
        for (id, expected) in model.iter().enumerate() {
            let actual = storage.get(e(id as u32)).map(|p| p.x);
            assert_eq!(actual, *expected);
        }
    }
}
