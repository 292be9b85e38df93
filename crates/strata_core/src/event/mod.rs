//! # Event System
//!
//! Observers react to structural changes without polling.
//!
//! ```text
//! attach / detach / create / destroy
//!              │
//!              ▼
//!        ┌───────────┐  exact type   ┌────────────┐
//!        │ EventBus  │──────────────>│ listener 1 │─> listener 2 ─> ...
//!        └───────────┘               └────────────┘
//! ```
//!
//! Dispatch is synchronous and happens inside the mutating call.

mod bus;
mod events;

pub use bus::{Event, EventBus, ListenerId};
pub use events::{ComponentAttached, ComponentDetached, EntityCreated, EntityRemoved};
