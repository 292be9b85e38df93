//! A single deferred mutation.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::EcsResult;

type ActionFn<C> = Box<dyn FnOnce(&mut C) -> EcsResult<()>>;

/// A mutation waiting to be applied to a context `C`.
///
/// The closure owns everything it needs; nothing is borrowed from the code
/// that enqueued it.
pub struct Action<C> {
    /// The mutation.
    run: ActionFn<C>,
    /// Time the action was created.
    created_at: Instant,
}

impl<C> Action<C> {
    /// Wraps a closure as an action, timestamped now.
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(&mut C) -> EcsResult<()> + 'static,
    {
        Self {
            run: Box::new(run),
            created_at: Instant::now(),
        }
    }

    /// Returns the creation time.
    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Returns how long the action has been waiting.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Applies the mutation, consuming the action.
    ///
    /// # Errors
    ///
    /// Returns whatever the mutation returns.
    pub fn execute(self, ctx: &mut C) -> EcsResult<()> {
        (self.run)(ctx)
    }
}

impl<C> fmt::Debug for Action<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
