//! # Event Bus
//!
//! Type-keyed listener registry with synchronous fan-out.
//!
//! Listeners are keyed by the exact event type; there is no matching on
//! supertypes. Dispatch runs in registration order and stops at the first
//! listener that returns an error, which is handed back to the publisher.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::error::{EcsError, EcsResult, ListenerError};

/// Marker trait for anything that can be published on an [`EventBus`].
pub trait Event: Any {}

/// Identifier returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ErasedListener = Box<dyn FnMut(&dyn Any) -> Result<(), ListenerError>>;

struct ListenerEntry {
    id: ListenerId,
    call: ErasedListener,
}

/// Registry of event listeners.
///
/// # Example
///
/// ```rust
/// use strata_core::{Entity, EntityCreated, EventBus};
///
/// let mut bus = EventBus::new();
/// bus.listen(|event: &EntityCreated| println!("created {}", event.entity));
/// bus.publish(&EntityCreated { entity: Entity::from_raw(0) }).unwrap();
/// ```
#[derive(Default)]
pub struct EventBus {
    /// Listeners per event type, in registration order.
    listeners: HashMap<TypeId, Vec<ListenerEntry>>,
    /// Next listener id to hand out.
    next_id: u64,
}

impl EventBus {
    /// Creates an empty event bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fallible listener for events of type `E`.
    ///
    /// An error returned by the listener aborts the remaining dispatch and is
    /// returned from [`publish`](Self::publish) as [`EcsError::Listener`].
    pub fn subscribe<E, F>(&mut self, mut listener: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let call: ErasedListener = Box::new(move |event: &dyn Any| {
            match event.downcast_ref::<E>() {
                Some(event) => listener(event),
                None => Ok(()),
            }
        });

        self.listeners
            .entry(TypeId::of::<E>())
            .or_default()
            .push(ListenerEntry { id, call });

        id
    }

    /// Registers a listener that cannot fail.
    pub fn listen<E, F>(&mut self, mut listener: F) -> ListenerId
    where
        E: Event,
        F: FnMut(&E) + 'static,
    {
        self.subscribe(move |event: &E| {
            listener(event);
            Ok(())
        })
    }

    /// Removes a listener.
    ///
    /// Removing the last listener of a type drops the type's entry.
    ///
    /// # Returns
    ///
    /// `true` if the listener was registered for `E`.
    pub fn unsubscribe<E: Event>(&mut self, id: ListenerId) -> bool {
        let key = TypeId::of::<E>();
        let Some(entries) = self.listeners.get_mut(&key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            self.listeners.remove(&key);
        }

        removed
    }

    /// Dispatches an event to every listener of its exact type.
    ///
    /// # Errors
    ///
    /// Returns the first listener error, wrapped in [`EcsError::Listener`].
    /// Listeners after the failing one are not called.
    pub fn publish<E: Event>(&mut self, event: &E) -> EcsResult<()> {
        let Some(entries) = self.listeners.get_mut(&TypeId::of::<E>()) else {
            return Ok(());
        };

        let erased: &dyn Any = event;
        for entry in entries.iter_mut() {
            (entry.call)(erased).map_err(EcsError::listener::<E>)?;
        }

        Ok(())
    }

    /// Removes every listener of type `E`.
    pub fn clear<E: Event>(&mut self) {
        self.listeners.remove(&TypeId::of::<E>());
    }

    /// Removes every listener of every type.
    pub fn clear_all(&mut self) {
        self.listeners.clear();
    }

    /// Returns the number of listeners registered for `E`.
    #[must_use]
    pub fn listener_count<E: Event>(&self) -> usize {
        self.listeners.get(&TypeId::of::<E>()).map_or(0, Vec::len)
    }

    /// Checks whether any listener is registered for `E`.
    #[must_use]
    pub fn has_listeners<E: Event>(&self) -> bool {
        self.listeners.contains_key(&TypeId::of::<E>())
    }
}
