//! FIFO of pending actions and the drain loop that applies them.

use std::collections::VecDeque;

use crate::error::{EcsError, EcsResult};

use super::pending::Action;

/// A context that owns its own action queue.
///
/// Draining needs the context mutably for each action while popping from the
/// queue it contains, so the queue is reached through this accessor rather
/// than borrowed for the whole drain.
pub trait ActionContext: Sized {
    /// Returns the queue of actions pending against this context.
    fn action_queue(&mut self) -> &mut ActionQueue<Self>;
}

/// First-in first-out queue of [`Action`]s over a context `C`.
pub struct ActionQueue<C> {
    queue: VecDeque<Action<C>>,
}

impl<C> Default for ActionQueue<C> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<C> ActionQueue<C> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an action.
    pub fn enqueue(&mut self, action: Action<C>) {
        self.queue.push_back(action);
    }

    /// Wraps a closure in an [`Action`] and appends it.
    pub fn push<F>(&mut self, run: F)
    where
        F: FnOnce(&mut C) -> EcsResult<()> + 'static,
    {
        self.enqueue(Action::new(run));
    }

    /// Removes the oldest action.
    pub fn pop(&mut self) -> Option<Action<C>> {
        self.queue.pop_front()
    }

    /// Returns the number of pending actions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Checks whether nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Discards every pending action without running it.
    ///
    /// # Returns
    ///
    /// The number of actions discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.queue.len();
        self.queue.clear();
        discarded
    }
}

impl<C: ActionContext> ActionQueue<C> {
    /// Runs the context's pending actions until its queue is empty.
    ///
    /// Actions enqueued while draining run in the same drain, after the ones
    /// already queued.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context owning the queue
    /// * `limit` - Maximum number of actions to run, `None` for no cap
    ///
    /// # Returns
    ///
    /// The number of actions executed.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DrainLimitExceeded`] when `limit` actions ran and more are
    ///   pending. The rest stay queued.
    /// - Any error returned by an action. Actions after it stay queued.
    pub fn drain(ctx: &mut C, limit: Option<usize>) -> EcsResult<usize> {
        let mut executed = 0;

        loop {
            if let Some(limit) = limit {
                if executed >= limit && !ctx.action_queue().is_empty() {
                    tracing::warn!(
                        "Drain stopped after {} actions, {} still pending",
                        limit,
                        ctx.action_queue().len()
                    );
                    return Err(EcsError::DrainLimitExceeded { limit });
                }
            }

            let Some(action) = ctx.action_queue().pop() else {
                break;
            };
            action.execute(ctx)?;
            executed += 1;
        }

        tracing::trace!("Drained {} actions", executed);
        Ok(executed)
    }
}
