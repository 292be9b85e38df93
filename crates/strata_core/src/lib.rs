//! # STRATA Core
//!
//! A small, single-threaded Entity Component System:
//! - Entities are monotonically issued ids
//! - Components live in per-type sparse sets with O(1) attach and detach
//! - Structural changes publish events to synchronous listeners
//! - Mutations can be deferred to the start of the next cycle
//!
//! ## Architecture Rules
//!
//! 1. **One owner** - The [`Universe`] owns every entity, component, listener and pending action
//! 2. **Context passing** - Systems and actions get `&mut Universe`, never a stored reference
//! 3. **Cycle boundary** - Deferred mutations become visible only after the next drain
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Component, Ecs, EcsResult, System, Universe};
//!
//! struct Position {
//!     x: f32,
//! }
//! impl Component for Position {}
//!
//! struct Drift;
//!
//! impl System for Drift {
//!     fn tick(&mut self, universe: &mut Universe, dt: f32) -> EcsResult<()> {
//!         universe.each_component_mut(|position: &mut Position, _| position.x += dt);
//!         Ok(())
//!     }
//! }
//!
//! let mut ecs = Ecs::default();
//! let entity = ecs.universe_mut().create_entity().unwrap();
//! ecs.universe_mut().attach_component(entity, Position { x: 0.0 }).unwrap();
//!
//! ecs.register_system(Drift).unwrap();
//! ecs.tick(0.5).unwrap();
//!
//! assert_eq!(ecs.universe().component::<Position>(entity).map(|p| p.x), Some(0.5));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod config;
pub mod driver;
pub mod ecs;
pub mod error;
pub mod event;
pub mod system;

pub use action::{Action, ActionContext, ActionQueue};
pub use config::{EcsConfig, DEFAULT_MAX_ENTITIES};
pub use driver::{CycleStats, Ecs};
pub use ecs::{
    Component, ComponentHandle, ComponentRegistry, ComponentStorage, ComponentType, Entity,
    EntityRegistry, Universe,
};
pub use error::{EcsError, EcsResult, ListenerError};
pub use event::{
    ComponentAttached, ComponentDetached, EntityCreated, EntityRemoved, Event, EventBus,
    ListenerId,
};
pub use system::{AsAny, System, SystemId, SystemManager};
