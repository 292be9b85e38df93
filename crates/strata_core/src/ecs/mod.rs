//! # Entity Component System
//!
//! Entities are bare ids, components are plain data, and every component type
//! lives in its own sparse set.
//!
//! ## Design Philosophy
//!
//! - Entity ids are issued monotonically and never reused
//! - Components are stored densely, one storage per type, for cache-friendly iteration
//! - Storages are created on first use and looked up by [`ComponentType`]
//! - Handles are `(entity, slot)` pairs, checked again on every resolve

mod component;
mod entity;
mod registry;
mod storage;
mod universe;

pub use component::{Component, ComponentType};
pub use entity::{Entity, EntityRegistry};
pub use registry::ComponentRegistry;
pub use storage::{ComponentHandle, ComponentStorage};
pub use universe::Universe;
