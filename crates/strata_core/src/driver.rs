//! # Cycle Driver
//!
//! ```text
//! Cycle N (tick(dt)):
//! ┌──────────────────────────────────────────────────────────┐
//! │ 1. DRAIN                                                 │
//! │    └─ Apply every action queued since cycle N-1          │
//! │       (and any they enqueue)                             │
//! │                                                          │
//! │ 2. SYSTEMS                                               │
//! │    └─ tick(universe, dt) in registration order           │
//! │       Deferred mutations land in the queue for cycle N+1 │
//! │                                                          │
//! │ 3. STATS                                                 │
//! │    └─ Record actions applied and cycle time              │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use crate::config::EcsConfig;
use crate::ecs::Universe;
use crate::error::EcsResult;
use crate::system::{System, SystemId, SystemManager};

/// Cycle time above which a warning is logged.
pub const SLOW_CYCLE: Duration = Duration::from_millis(33);

/// Statistics about the cycles run so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Number of completed cycles.
    pub cycles: u64,
    /// Actions applied by the last cycle's drain.
    pub actions_applied: usize,
    /// Duration of the last cycle in microseconds.
    pub last_cycle_us: u64,
    /// Longest cycle so far in microseconds.
    pub max_cycle_us: u64,
}

/// The top-level engine: a [`Universe`] plus the systems that run on it.
///
/// # Example
///
/// ```rust
/// use strata_core::{EcsConfig, Ecs};
///
/// let mut ecs = Ecs::new(EcsConfig::with_max_entities(1_000)).unwrap();
/// let entity = ecs.universe_mut().create_entity().unwrap();
/// ecs.tick(0.016).unwrap();
/// assert!(ecs.universe().is_alive(entity));
/// assert_eq!(ecs.stats().cycles, 1);
/// ```
pub struct Ecs {
    universe: Universe,
    systems: SystemManager,
    stats: CycleStats,
}

impl Default for Ecs {
    fn default() -> Self {
        Self::from_universe(Universe::default())
    }
}

impl Ecs {
    /// Creates an engine with an empty universe.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: EcsConfig) -> EcsResult<Self> {
        Universe::new(config).map(Self::from_universe)
    }

    /// Wraps an existing universe.
    #[must_use]
    pub fn from_universe(universe: Universe) -> Self {
        Self {
            universe,
            systems: SystemManager::new(),
            stats: CycleStats::default(),
        }
    }

    /// Returns the universe.
    #[inline]
    #[must_use]
    pub const fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Returns the universe mutably.
    #[inline]
    pub fn universe_mut(&mut self) -> &mut Universe {
        &mut self.universe
    }

    /// Returns the system manager.
    #[inline]
    #[must_use]
    pub const fn systems(&self) -> &SystemManager {
        &self.systems
    }

    /// Returns the statistics of the cycles run so far.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Registers a system, calling its `init`.
    ///
    /// # Errors
    ///
    /// Returns an error if `init` fails.
    pub fn register_system<S: System>(&mut self, system: S) -> EcsResult<SystemId> {
        self.systems.register(&mut self.universe, system)
    }

    /// Unregisters a system, calling its `destroy`.
    ///
    /// # Errors
    ///
    /// Returns an error if `destroy` fails. The system is removed regardless.
    pub fn unregister_system(&mut self, id: SystemId) -> EcsResult<Option<Box<dyn System>>> {
        self.systems.unregister(&mut self.universe, id)
    }

    /// Returns the first registered system of type `S`.
    #[must_use]
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.get()
    }

    /// Returns the first registered system of type `S` mutably.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut()
    }

    /// Runs one cycle: drain pending actions, then tick every system.
    ///
    /// # Arguments
    ///
    /// * `dt` - Time since the previous cycle, in seconds
    ///
    /// # Errors
    ///
    /// Returns the first drain or system error. The cycle is not counted.
    pub fn tick(&mut self, dt: f32) -> EcsResult<()> {
        let start = Instant::now();

        let applied = self.universe.drain_actions()?;
        self.systems.tick(&mut self.universe, dt)?;

        let elapsed = start.elapsed();
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        self.stats.cycles += 1;
        self.stats.actions_applied = applied;
        self.stats.last_cycle_us = elapsed_us;
        self.stats.max_cycle_us = self.stats.max_cycle_us.max(elapsed_us);

        if elapsed > SLOW_CYCLE {
            tracing::warn!(
                "Cycle {} took {}us ({} actions applied)",
                self.stats.cycles,
                elapsed_us,
                applied
            );
        }

        Ok(())
    }

    /// Unregisters every system, then resets the universe.
    ///
    /// # Errors
    ///
    /// Returns the first `destroy` error. The universe is reset regardless.
    pub fn shutdown(&mut self) -> EcsResult<()> {
        let result = self.systems.clear(&mut self.universe);
        self.universe.recreate();
        tracing::info!("Shut down after {} cycles", self.stats.cycles);
        result
    }
}
