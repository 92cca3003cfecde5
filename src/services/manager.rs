//! # Manager: sequences a tree of services with fault containment.
//!
//! [`Manager`] owns an ordered list of child [`Service`]s and drives them
//! through the lifecycle phases in order. A child that reports failure or
//! panics in one phase is logged with its name and excluded from later
//! phases; its siblings are unaffected, and a partially-initialized tree
//! stays safe to use.
//!
//! ## Rules
//! - `start` only touches children whose `initialize` succeeded; `stop`
//!   only touches started children; `terminate` only initialized ones.
//! - Phase order is child insertion order.
//! - `Manager` itself implements [`Service`], so trees nest.
//! - The manager is driven by one thread at a time (all phase methods take
//!   `&mut self`); cross-thread coordination belongs to the bus and pools.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::error;

use crate::bus::EventBus;
use crate::error::panic_message;

use super::service::Service;

/// Ordered collection of services driven through the lifecycle as one unit.
///
/// # Example
/// ```
/// use threadkit::{Manager, Service};
///
/// struct Heartbeat;
/// impl Service for Heartbeat {
///     fn name(&self) -> &str {
///         "heartbeat"
///     }
/// }
///
/// let mut manager = Manager::new("app");
/// manager.add_child(Box::new(Heartbeat));
/// assert!(manager.initialize());
/// assert!(manager.start());
/// assert!(manager.stop());
/// assert!(manager.terminate());
/// ```
pub struct Manager {
    name: String,
    children: Vec<Box<dyn Service>>,
    /// Indices into `children` whose `initialize` succeeded.
    initialized: Vec<usize>,
    /// Indices into `children` whose `start` succeeded.
    started: Vec<usize>,
    bus: Option<Arc<EventBus>>,
}

impl Manager {
    /// Creates an empty manager with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            initialized: Vec::new(),
            started: Vec::new(),
            bus: None,
        }
    }

    /// Appends a child; lifecycle phases run in insertion order.
    pub fn add_child(&mut self, mut child: Box<dyn Service>) {
        if let Some(bus) = &self.bus {
            child.set_bus(Arc::clone(bus));
        }
        self.children.push(child);
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// `true` when no children were added.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Initializes, starts, then polls the tree every `period` until the
    /// predicate turns false or any started child stops being operational;
    /// finally stops and terminates.
    ///
    /// Returns `false` when initialization or startup failed for any child.
    pub fn run_until(&mut self, period: Duration, keep_running: impl Fn() -> bool) -> bool {
        if !self.initialize() {
            self.terminate();
            return false;
        }
        if !self.start() {
            self.stop();
            self.terminate();
            return false;
        }
        while keep_running() && self.is_operational() {
            thread::sleep(period);
        }
        self.stop();
        self.terminate();
        true
    }

    /// Runs one child's phase with panic containment, logging failures.
    fn contained(name: &str, phase: &'static str, call: impl FnOnce() -> bool) -> bool {
        match catch_unwind(AssertUnwindSafe(call)) {
            Ok(true) => true,
            Ok(false) => {
                error!(service = name, phase, "service reported failure");
                false
            }
            Err(payload) => {
                error!(
                    service = name,
                    phase,
                    reason = panic_message(&payload),
                    "service panicked",
                );
                false
            }
        }
    }
}

impl Service for Manager {
    fn initialize(&mut self) -> bool {
        let mut all_ok = true;
        for (index, child) in self.children.iter_mut().enumerate() {
            let name = child.name().to_string();
            if Self::contained(&name, "initialize", || child.initialize()) {
                self.initialized.push(index);
            } else {
                all_ok = false;
            }
        }
        all_ok
    }

    fn start(&mut self) -> bool {
        let mut all_ok = true;
        for &index in &self.initialized {
            let child = &mut self.children[index];
            let name = child.name().to_string();
            if Self::contained(&name, "start", || child.start()) {
                self.started.push(index);
            } else {
                all_ok = false;
            }
        }
        all_ok
    }

    fn is_operational(&self) -> bool {
        self.started
            .iter()
            .all(|&index| self.children[index].is_operational())
    }

    fn stop(&mut self) -> bool {
        let mut all_ok = true;
        for index in std::mem::take(&mut self.started) {
            let child = &mut self.children[index];
            let name = child.name().to_string();
            if !Self::contained(&name, "stop", || child.stop()) {
                all_ok = false;
            }
        }
        all_ok
    }

    fn terminate(&mut self) -> bool {
        let mut all_ok = true;
        for index in std::mem::take(&mut self.initialized) {
            let child = &mut self.children[index];
            let name = child.name().to_string();
            if !Self::contained(&name, "terminate", || child.terminate()) {
                all_ok = false;
            }
        }
        all_ok
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_bus(&mut self, bus: Arc<EventBus>) {
        for child in &mut self.children {
            child.set_bus(Arc::clone(&bus));
        }
        self.bus = Some(bus);
    }
}
