//! # Deferred Mutations
//!
//! Structural changes requested mid-cycle are queued as [`Action`]s and
//! applied together at the start of the next cycle, so iteration never sees
//! a half-applied batch.

mod pending;
mod queue;

pub use pending::Action;
pub use queue::{ActionContext, ActionQueue};
