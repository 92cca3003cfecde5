//! # Service: the uniform lifecycle contract for hosted components.
//!
//! Components implement [`Service`] and are sequenced by a
//! [`Manager`](crate::Manager):
//!
//! ```text
//! initialize ──► start ──► (is_operational polled) ──► stop ──► terminate
//! ```
//!
//! Every method has a permissive default, so an implementation only
//! overrides the phases it cares about. The [`EventBus`](crate::EventBus)
//! is injected through [`set_bus`](Service::set_bus) rather than reached
//! through a global, so a component can subscribe and broadcast regardless
//! of how its siblings are wired.

use std::sync::Arc;

use crate::bus::EventBus;

/// Uniform lifecycle contract: initialize, start, observe, stop, terminate.
///
/// Return `false` from a phase to report failure; the owning
/// [`Manager`](crate::Manager) logs it and excludes the component from
/// later phases. Panics are contained the same way.
pub trait Service: Send {
    /// Acquires resources before anything starts. Runs once.
    fn initialize(&mut self) -> bool {
        true
    }

    /// Begins active work. Only called after a successful `initialize`.
    fn start(&mut self) -> bool {
        true
    }

    /// `true` while the component is healthy; polled between start and stop.
    fn is_operational(&self) -> bool {
        true
    }

    /// Ceases active work. Only called for started components.
    fn stop(&mut self) -> bool {
        true
    }

    /// Releases resources. Only called for initialized components.
    fn terminate(&mut self) -> bool {
        true
    }

    /// Identifying name, used in lifecycle logs and bus subscriptions.
    fn name(&self) -> &str {
        "service"
    }

    /// Capability injection: receives the process's event bus.
    ///
    /// The default keeps nothing; components that subscribe or broadcast
    /// store the `Arc`.
    fn set_bus(&mut self, bus: Arc<EventBus>) {
        let _ = bus;
    }
}
