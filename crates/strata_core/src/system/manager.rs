//! Ordered registry of systems.

use crate::ecs::Universe;
use crate::error::{EcsError, EcsResult};

use super::{System, SystemId};

struct SystemEntry {
    id: SystemId,
    system: Box<dyn System>,
}

impl SystemEntry {
    fn system(&self) -> &dyn System {
        self.system.as_ref()
    }

    fn system_mut(&mut self) -> &mut dyn System {
        self.system.as_mut()
    }
}

/// Owns the registered systems and ticks them in registration order.
#[derive(Default)]
pub struct SystemManager {
    systems: Vec<SystemEntry>,
    next_id: u64,
}

impl SystemManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes a system and appends it to the tick order.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::System`] if `init` fails. The system is dropped.
    pub fn register<S: System>(&mut self, universe: &mut Universe, system: S) -> EcsResult<SystemId> {
        self.register_boxed(universe, Box::new(system))
    }

    /// Boxed variant of [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::System`] if `init` fails.
    pub fn register_boxed(
        &mut self,
        universe: &mut Universe,
        mut system: Box<dyn System>,
    ) -> EcsResult<SystemId> {
        system.init(universe).map_err(|err| EcsError::System {
            system: system.name().to_owned(),
            reason: format!("init failed: {err}"),
        })?;

        let id = SystemId(self.next_id);
        self.next_id += 1;
        tracing::debug!("Registered system {} as {}", system.name(), id);

        self.systems.push(SystemEntry { id, system });
        Ok(id)
    }

    /// Removes a system and calls its `destroy`.
    ///
    /// # Returns
    ///
    /// The removed system, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::System`] if `destroy` fails. The system is removed
    /// regardless.
    pub fn unregister(
        &mut self,
        universe: &mut Universe,
        id: SystemId,
    ) -> EcsResult<Option<Box<dyn System>>> {
        let Some(index) = self.systems.iter().position(|entry| entry.id == id) else {
            return Ok(None);
        };

        let mut entry = self.systems.remove(index);
        tracing::debug!("Unregistered system {} ({})", entry.system().name(), id);
        destroy(&mut entry, universe)?;
        Ok(Some(entry.system))
    }

    /// Ticks every system in registration order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing system.
    pub fn tick(&mut self, universe: &mut Universe, dt: f32) -> EcsResult<()> {
        for entry in &mut self.systems {
            entry.system_mut().tick(universe, dt)?;
        }
        Ok(())
    }

    /// Returns the first registered system of type `S`.
    #[must_use]
    pub fn get<S: System>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|entry| entry.system().as_any().downcast_ref::<S>())
    }

    /// Returns the first registered system of type `S` mutably.
    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|entry| entry.system_mut().as_any_mut().downcast_mut::<S>())
    }

    /// Checks whether a system of type `S` is registered.
    #[must_use]
    pub fn contains<S: System>(&self) -> bool {
        self.get::<S>().is_some()
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Checks whether no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Iterates over system ids in tick order.
    pub fn ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.systems.iter().map(|entry| entry.id)
    }

    /// Unregisters every system, destroying them in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first `destroy` error, after every system was destroyed
    /// and removed.
    pub fn clear(&mut self, universe: &mut Universe) -> EcsResult<()> {
        let mut first_error = None;
        for mut entry in self.systems.drain(..) {
            if let Err(err) = destroy(&mut entry, universe) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn destroy(entry: &mut SystemEntry, universe: &mut Universe) -> EcsResult<()> {
    let system = entry.system_mut();
    system.destroy(universe).map_err(|err| EcsError::System {
        system: system.name().to_owned(),
        reason: format!("destroy failed: {err}"),
    })
}
