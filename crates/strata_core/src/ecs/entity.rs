//! # Entity Management
//!
//! Entities are plain integer ids handed out from a monotonic watermark.
//! Ids are never recycled: destroying an entity only removes it from the live
//! set, the watermark keeps moving forward until a full [`EntityRegistry::clear`].

use std::fmt;

use crate::config::EcsConfig;

/// Identifier of an entity.
///
/// Valid ids lie in `0..capacity`. [`Entity::NULL`] is returned when the
/// registry is exhausted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Null/invalid entity.
    pub const NULL: Self = Self(u32::MAX);

    /// Creates an entity from its raw id.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an index into per-entity arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the null entity.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("Entity(NULL)")
        } else {
            write!(f, "Entity({})", self.0)
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Allocates entity ids and tracks which of them are alive.
///
/// # Validity vs liveness
///
/// * [`is_valid`](Self::is_valid): the id was issued at some point
///   (`id < watermark`). Stays true after destruction.
/// * [`is_alive`](Self::is_alive): the id is currently in the live set.
///
/// Anything that mutates components must check liveness.
pub struct EntityRegistry {
    /// Liveness flag per issued id (`alive.len() == watermark`).
    alive: Vec<bool>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Maximum number of ids that can be issued.
    capacity: u32,
}

impl EntityRegistry {
    /// Creates a registry that can issue up to `capacity` ids.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or `u32::MAX` (reserved for [`Entity::NULL`]).
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(capacity < u32::MAX, "Capacity must leave room for Entity::NULL");

        Self {
            alive: Vec::new(),
            alive_count: 0,
            capacity,
        }
    }

    /// Creates a registry sized from a configuration.
    #[must_use]
    pub fn with_config(config: &EcsConfig) -> Self {
        Self::new(config.max_entities)
    }

    /// Returns the maximum number of ids this registry can issue.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Returns the id the next successful [`create`](Self::create) will issue.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_id(&self) -> u32 {
        // Bounded by `capacity`, which is below u32::MAX.
        self.alive.len() as u32
    }

    /// Issues the next entity id.
    ///
    /// # Returns
    ///
    /// The new entity, or [`Entity::NULL`] once `capacity` ids have been issued.
    pub fn create(&mut self) -> Entity {
        let next = self.next_id();
        if next >= self.capacity {
            tracing::warn!("Entity registry exhausted at capacity {}", self.capacity);
            return Entity::NULL;
        }

        self.alive.push(true);
        self.alive_count += 1;
        Entity(next)
    }

    /// Removes an entity from the live set.
    ///
    /// The id is not handed out again.
    ///
    /// # Returns
    ///
    /// `true` if the entity was alive.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        match self.alive.get_mut(entity.index()) {
            Some(flag) if *flag => {
                *flag = false;
                self.alive_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Checks whether the id was ever issued by this registry.
    #[inline]
    #[must_use]
    pub fn is_valid(&self, entity: Entity) -> bool {
        !entity.is_null() && entity.index() < self.alive.len()
    }

    /// Checks whether the entity is currently alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Iterates over alive entities in ascending id order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| Entity::from_raw(index_to_id(index)))
    }

    /// Forgets every entity and resets the watermark to zero.
    ///
    /// Only meant for full resets, never mid-cycle.
    pub fn clear(&mut self) {
        self.alive.clear();
        self.alive_count = 0;
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn index_to_id(index: usize) -> u32 {
    index as u32
}
