//! Typed publish/subscribe event dispatch.

mod event_bus;
mod handlers;
mod timing;

pub use event_bus::EventBus;
