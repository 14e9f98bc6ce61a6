//! Async event bus for entity lifecycle and execution notifications
//! (component D)

pub mod bus;
pub mod error;
pub mod event;

pub use bus::{EventBus, Handler, Subscription, DEFAULT_HANDLER_TIMEOUT};
pub use error::{EventError, EventResult};
pub use event::{Event, EventKind};
