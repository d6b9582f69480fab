//! Domain events and their in-process distribution.
//!
//! Aggregates decide events, `execute` applies them, and an `EventBus` fans
//! the accepted events out to observers once the mutation has finished.

pub mod bus;
pub mod event;
pub mod handler;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use handler::execute;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
