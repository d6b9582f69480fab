//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes events that were already applied to an aggregate to
//! any number of observers (analytics, logging, tests). It is not a source
//! of truth: the aggregate is.
//!
//! Consumers receive messages in publication order for a single publisher.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics). Designed for single-threaded consumption.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// while let Ok(event) = subscription.try_recv() {
///     observe(event);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain every message that is already queued.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// Command → Aggregate (handle + apply) → Event Bus (publish) → Observers
/// ```
///
/// `publish()` can fail; callers decide whether that matters. A failed
/// publication never rolls back state that was already applied.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
