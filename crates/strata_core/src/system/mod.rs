//! # Systems
//!
//! Systems hold the behavior: each cycle they read and write components
//! through the [`Universe`] they are handed. They never keep a reference to
//! it between calls.

mod manager;

use std::any::Any;
use std::fmt;

use crate::ecs::Universe;
use crate::error::EcsResult;

pub use manager::SystemManager;

/// Downcasting support for trait objects.
///
/// Implemented for every `'static` type; [`System`] requires it so the
/// [`SystemManager`] can hand back concrete system types.
pub trait AsAny: Any {
    /// Returns `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// Returns `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior run once per cycle.
///
/// # Example
///
/// ```rust
/// use strata_core::{Component, EcsResult, System, Universe};
///
/// struct Velocity(f32);
/// impl Component for Velocity {}
///
/// struct Friction;
///
/// impl System for Friction {
///     fn tick(&mut self, universe: &mut Universe, dt: f32) -> EcsResult<()> {
///         universe.each_component_mut(|velocity: &mut Velocity, _| velocity.0 *= 1.0 - dt);
///         Ok(())
///     }
/// }
/// ```
pub trait System: AsAny {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once, when the system is registered.
    ///
    /// # Errors
    ///
    /// An error aborts the registration.
    fn init(&mut self, _universe: &mut Universe) -> EcsResult<()> {
        Ok(())
    }

    /// Called once, when the system is unregistered.
    ///
    /// # Errors
    ///
    /// The system is removed whether or not this fails.
    fn destroy(&mut self, _universe: &mut Universe) -> EcsResult<()> {
        Ok(())
    }

    /// Called every cycle with the elapsed time in seconds.
    ///
    /// # Errors
    ///
    /// An error ends the cycle; later systems do not run.
    fn tick(&mut self, universe: &mut Universe, dt: f32) -> EcsResult<()>;
}

/// Identifier of a registered system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SystemId(u64);

impl SystemId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
