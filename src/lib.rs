//! # threadkit
//!
//! **threadkit** is a thread-based concurrency toolkit for long-running
//! service processes: blocking collections, worker-thread pools (immediate
//! and time-scheduled), and a typed publish/subscribe event bus that
//! decouples producers and consumers inside one process.
//!
//! The core is strictly shared-state, lock-based concurrency over a fixed
//! set of persistent OS threads. There is no async runtime and no
//! cooperative scheduling anywhere: suspension happens only on condition
//! variables, and cancellation is cooperative (a flag plus a broadcast
//! wake). Locks are held for bounded structural mutation only, never across
//! a task or handler invocation.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            ┌────────────────────┐     ┌────────────────────┐
//!            │      FifoPool      │     │   ScheduledPool    │
//!            │  execute(task)     │     │  execute(delay, t) │
//!            │                    │     │  …fixed rate/delay │
//!            └─────────┬──────────┘     └─────────┬──────────┘
//!                      │  source strategy         │
//!            ┌─────────▼──────────────────────────▼──────────┐
//!            │  WorkerPool (N persistent threads, admission  │
//!            │  gate, ready latch, cooperative shutdown)     │
//!            └─────────┬─────────────────────────────────────┘
//!                      │ blocking retrieval
//!            ┌─────────▼──────────┐
//!            │   BlockingQueue    │  Linked / Array / Priority backings
//!            └─────────▲──────────┘
//!                      │ execution queue (FIFO of deferred closures)
//!            ┌─────────┴──────────┐     ┌────────────────────┐
//!            │      EventBus      │◄────│ Service / Manager  │
//!            │ subscribe/broadcast│ bus │ lifecycle tree     │
//!            │ run / runUntilEmpty│     │ (capability-set)   │
//!            └────────────────────┘     └────────────────────┘
//! ```
//!
//! ## Subsystems
//! - [`BlockingQueue`]: one mutex, one condition variable, three orderings
//!   ([`LinkedBlockingQueue`], [`ArrayBlockingQueue`],
//!   [`PriorityBlockingQueue`]). Strict accessors return
//!   [`QueueError::Empty`]; nullable ones return `Option`; [`take`]
//!   suspends with a caller-supplied stop predicate.
//! - [`WorkerPool`] + [`TaskSource`]: the pool owns threads and lifecycle,
//!   the source owns retrieval and execution. `start` returns fully
//!   staffed; `stop` returns only after every worker exited and joined.
//! - [`FifoPool`]: submit-and-forget execution in submission order.
//! - [`ScheduledPool`]: deadline-ordered store with one-shot, fixed-rate,
//!   and fixed-delay re-arming.
//! - [`EventBus`]: type-keyed handler registry; `broadcast` defers one
//!   closure per handler onto a FIFO execution queue drained by a
//!   caller-driven loop, with per-handler latency statistics and panic
//!   containment.
//! - [`Service`] / [`Manager`]: the lifecycle contract for components built
//!   on top, sequenced with fault containment.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use threadkit::EventBus;
//!
//! #[derive(Debug)]
//! struct Tick(u64);
//!
//! let bus = Arc::new(EventBus::new());
//! bus.subscribe::<Tick, _>("printer", |t| println!("tick {}", t.0));
//! bus.broadcast(Tick(1));
//! bus.run_until_empty();
//! ```
//!
//! [`take`]: BlockingQueue::take

mod bus;
mod error;
mod pool;
mod queue;
mod services;

pub use bus::EventBus;
pub use error::QueueError;
pub use pool::{FifoPool, RepeatMode, Runnable, ScheduledPool, TaskSource, WorkerPool};
pub use queue::{
    Array, ArrayBlockingQueue, Backing, BlockingQueue, Linked, LinkedBlockingQueue, Priority,
    PriorityBlockingQueue,
};
pub use services::{Manager, Service};
