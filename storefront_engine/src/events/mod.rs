//! Order lifecycle events and the hook system that reacts to them.
//!
//! The state machine emits an event for every order creation and every status transition. Each
//! event is turned into exactly one notification row by the [`NotificationEmitter`], and is also
//! published to any subscriber hooks, which is where an application wires up its delivery
//! transport (email, push, websocket). Both paths are best-effort: a failure is logged and never
//! rolls back the order or stock changes that produced the event.

mod channel;
mod emitter;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use emitter::{derive_notification, NotificationEmitter};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
