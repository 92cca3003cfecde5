//! # Typed publish/subscribe bus with a caller-driven dispatch loop.
//!
//! [`EventBus`] decouples producers and consumers inside one process.
//! [`broadcast`](EventBus::broadcast) never invokes handlers: it enqueues one
//! deferred closure per registered handler onto an internal FIFO execution
//! queue, and whichever thread drives [`run`](EventBus::run) /
//! [`run_until_empty`](EventBus::run_until_empty) executes them.
//!
//! ## Architecture
//! ```text
//! broadcast(ev)                          driver thread(s)
//!   │ look up handlers for typeof(ev)      │
//!   │ enqueue one closure per handler ───► [execution queue (FIFO)] ─► run()
//!   ▼                                      │  closure = handler + Arc<ev>
//! returns immediately                      ▼
//!                                        handler(&ev)   (panic-contained,
//!                                                        latency-recorded)
//! ```
//!
//! ## Rules
//! - `broadcast` never blocks the caller; zero handlers for a type is a
//!   no-op returning 0.
//! - Handlers for one type run in subscription order when drained
//!   single-threaded.
//! - A panicking handler is logged once and never affects siblings or the
//!   drive loop.
//! - `stop()` interrupts the execution queue so blocked `run()` calls
//!   return `false`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::queue::LinkedBlockingQueue;

use super::handlers::Registry;
use super::timing::render_report;

/// Deferred handler invocation produced by `broadcast`.
type Deferred = Box<dyn FnOnce() + Send>;

/// Typed publish/subscribe registry with an internal execution queue.
///
/// Cheap to share behind an `Arc`; every method takes `&self`. Subscriber
/// records live until the bus is dropped — there is no unsubscribe.
///
/// # Example
/// ```
/// use threadkit::EventBus;
///
/// struct Greeting(&'static str);
///
/// let bus = EventBus::new();
/// bus.subscribe::<Greeting, _>("printer", |g| println!("{}", g.0));
/// bus.broadcast(Greeting("hello"));
/// bus.run_until_empty();
/// ```
pub struct EventBus {
    registry: Registry,
    execution_queue: LinkedBlockingQueue<Deferred>,
    running: AtomicBool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a bus in the running state.
    pub fn new() -> Self {
        Self {
            registry: Registry::default(),
            execution_queue: LinkedBlockingQueue::new(),
            running: AtomicBool::new(true),
        }
    }

    /// Registers a named handler for event type `E`.
    ///
    /// Multiple handlers per type are allowed; within a type they are
    /// invoked in subscription order. Subscriptions to distinct types are
    /// independent.
    pub fn subscribe<E, F>(&self, name: impl Into<String>, handler: F)
    where
        E: Send + Sync + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.registry.subscribe::<E, F>(name.into(), handler);
    }

    /// Enqueues one deferred invocation per handler registered for `E`'s
    /// runtime type and returns the handler count.
    ///
    /// Never invokes handlers synchronously and never blocks. The event is
    /// shared across the enqueued closures behind an `Arc`.
    pub fn broadcast<E: Send + Sync + 'static>(&self, event: E) -> usize {
        let handlers = self.registry.handlers_for::<E>();
        if handlers.is_empty() {
            return 0;
        }

        let event = Arc::new(event);
        let count = handlers.len();
        for handler in handlers {
            let event = Arc::clone(&event);
            self.execution_queue
                .add(Box::new(move || handler.invoke(event.as_ref())));
        }
        count
    }

    /// Drains the execution queue on the calling thread until it is empty.
    /// Does not block when the queue is already empty.
    pub fn run_until_empty(&self) {
        while let Some(op) = self.execution_queue.poll() {
            op();
        }
    }

    /// Executes at most one deferred invocation, blocking until one is
    /// available or [`stop`](Self::stop) is signaled.
    ///
    /// Returns `true` when an invocation executed, `false` when woken by
    /// shutdown with the queue still empty.
    pub fn run(&self) -> bool {
        match self
            .execution_queue
            .take(|| !self.running.load(Ordering::Acquire))
        {
            Some(op) => {
                op();
                true
            }
            None => false,
        }
    }

    /// Marks the bus running so [`run`](Self::run) blocks for work again.
    pub fn start(&self) {
        self.running.store(true, Ordering::Release);
    }

    /// Clears the running flag and interrupts the execution queue; every
    /// blocked [`run`](Self::run) returns `false` once the queue drains.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.execution_queue.interrupt_blocking();
    }

    /// Number of deferred invocations not yet executed.
    pub fn pending(&self) -> usize {
        self.execution_queue.len()
    }

    /// Formatted per-(event type, handler) latency report, sorted by
    /// descending average, ties by handler name then event-type name.
    pub fn timing_report(&self) -> String {
        render_report(&self.registry.stats_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug)]
    struct PointMoved {
        x: i32,
    }

    struct Unrelated;

    #[test]
    fn test_subscription_order_preserved_single_threaded() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

        for name in ["A", "B", "C"] {
            let order = Arc::clone(&order);
            bus.subscribe::<PointMoved, _>(name, move |_| order.lock().push(name));
        }

        assert_eq!(bus.broadcast(PointMoved { x: 1 }), 3);
        bus.run_until_empty();
        assert_eq!(*order.lock(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_broadcast_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.subscribe::<PointMoved, _>("p", |_| {});
        assert_eq!(bus.broadcast(Unrelated), 0);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_broadcast_defers_instead_of_invoking() {
        let bus = EventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        bus.subscribe::<PointMoved, _>("c", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.broadcast(PointMoved { x: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.pending(), 1);

        bus.run_until_empty();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_panicking_handlers_do_not_block_siblings() {
        let bus = EventBus::new();
        let value = Arc::new(AtomicUsize::new(0));

        bus.subscribe::<PointMoved, _>("str panic", |_| panic!("testing str"));
        bus.subscribe::<PointMoved, _>("string panic", |_| {
            std::panic::panic_any("testing".to_string())
        });
        bus.subscribe::<PointMoved, _>("opaque panic", |_| std::panic::panic_any(2_i32));
        let sink = Arc::clone(&value);
        bus.subscribe::<PointMoved, _>("no issue", move |ev| {
            sink.store(ev.x as usize, Ordering::SeqCst);
        });

        bus.broadcast(PointMoved { x: 7 });
        bus.run_until_empty();
        assert_eq!(value.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_run_executes_one_and_stop_unblocks() {
        let bus = Arc::new(EventBus::new());
        let value = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&value);
        bus.subscribe::<PointMoved, _>("sink", move |ev| {
            sink.store(ev.x as usize, Ordering::SeqCst);
        });

        bus.broadcast(PointMoved { x: 1 });
        bus.stop();
        // queued work still drains after stop; run returns false once empty
        while bus.run() {}
        assert_eq!(value.load(Ordering::SeqCst), 1);

        bus.start();
        bus.broadcast(PointMoved { x: 2 });
        bus.stop();
        while bus.run() {}
        assert_eq!(value.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_releases_blocked_run() {
        let bus = Arc::new(EventBus::new());
        let driver = {
            let bus = Arc::clone(&bus);
            thread::spawn(move || bus.run())
        };
        thread::sleep(Duration::from_millis(20));
        bus.stop();
        assert!(!driver.join().unwrap());
    }

    #[test]
    fn test_concurrent_broadcast_and_first_subscribe() {
        let bus = Arc::new(EventBus::new());
        let publisher = {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for _ in 0..500 {
                    bus.broadcast(PointMoved { x: 1 });
                }
            })
        };
        let subscriber = {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                bus.subscribe::<PointMoved, _>("late", |_| {});
            })
        };
        publisher.join().unwrap();
        subscriber.join().unwrap();
        // no panic, no lost registry: further broadcasts reach the handler
        assert_eq!(bus.broadcast(PointMoved { x: 2 }), 1);
        bus.run_until_empty();
    }

    #[test]
    fn test_timing_report_lists_each_subscription() {
        let bus = EventBus::new();
        bus.subscribe::<PointMoved, _>("fast", |_| {});
        bus.subscribe::<PointMoved, _>("slow", |_| {
            thread::sleep(Duration::from_millis(2));
        });
        bus.broadcast(PointMoved { x: 1 });
        bus.run_until_empty();

        let report = bus.timing_report();
        assert!(report.contains("fast"), "{report}");
        assert!(report.contains("slow"), "{report}");
        let slow_at = report.find("slow").unwrap();
        let fast_at = report.find("fast").unwrap();
        assert!(slow_at < fast_at, "slow handler should sort first:\n{report}");
    }
}
