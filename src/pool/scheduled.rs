//! # Time-scheduled worker pool: one-shot, fixed-rate, and fixed-delay tasks.
//!
//! [`ScheduledPool`] plugs a deadline-ordered task store into the
//! [`WorkerPool`](super::WorkerPool) core. The store is a min-heap on
//! `next_run` behind one mutex and one condition variable.
//!
//! ## Re-arming modes
//! - [`RepeatMode::Once`] — the entry dies after its single run.
//! - [`RepeatMode::FixedRate`] — next run = previous **scheduled** time +
//!   period. Drift-free; an overdue task catches up back-to-back.
//! - [`RepeatMode::FixedDelay`] — next run = previous **completion** time +
//!   period. Never compounds with the task's own duration.
//!
//! A repeating entry is re-armed even when its run panics; the panic is
//! re-raised after reinsertion and logged at the worker boundary. Only
//! [`stop`](ScheduledPool::stop) retires a repeating entry.
//!
//! ## Worker wait protocol
//! ```text
//! loop:
//!   stopped?            → return None
//!   store empty?        → wait (insertion or shutdown)
//!   head due?           → pop under the lock, run outside it
//!   else                → wait_until(head deadline); re-evaluate
//! ```
//! Every insertion notifies **all** waiters, so a newly scheduled earlier
//! task preempts a worker sleeping toward a later deadline. Removal happens
//! atomically under the lock before execution, so at most one worker ever
//! runs a given entry.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::core::{Runnable, TaskSource, WorkerPool};

/// How a scheduled entry re-arms after a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    /// Run once at the scheduled time, then discard.
    Once,
    /// Reschedule at `previous scheduled time + period`.
    FixedRate,
    /// Reschedule at `completion time + period`.
    FixedDelay,
}

/// One scheduled entry: payload plus its deadline and re-arm rule.
struct ScheduledTask<T> {
    next_run: Instant,
    period: Duration,
    mode: RepeatMode,
    task: T,
}

// Heap order: earliest deadline on top (reversed Instant comparison, since
// BinaryHeap pops the maximum). Payloads never participate in the order.
impl<T> PartialEq for ScheduledTask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.next_run == other.next_run
    }
}

impl<T> Eq for ScheduledTask<T> {}

impl<T> PartialOrd for ScheduledTask<T> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ScheduledTask<T> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other.next_run.cmp(&self.next_run)
    }
}

struct ScheduledSource<T> {
    store: Mutex<BinaryHeap<ScheduledTask<T>>>,
    due: Condvar,
}

impl<T: Runnable + Clone> ScheduledSource<T> {
    fn insert(&self, entry: ScheduledTask<T>) {
        let mut store = self.store.lock();
        store.push(entry);
        drop(store);
        // notify_all: the new entry may be earlier than the deadline a
        // sleeping worker is waiting toward.
        self.due.notify_all();
    }

    fn reinsert(&self, entry: ScheduledTask<T>) {
        let mut store = self.store.lock();
        store.push(entry);
        drop(store);
        self.due.notify_one();
    }
}

impl<T: Runnable + Clone> TaskSource for ScheduledSource<T> {
    type Task = ScheduledTask<T>;

    fn next(&self, running: &AtomicBool) -> Option<ScheduledTask<T>> {
        let mut store = self.store.lock();
        loop {
            if !running.load(Ordering::Acquire) {
                return None;
            }
            let Some(head) = store.peek() else {
                self.due.wait(&mut store);
                continue;
            };
            let deadline = head.next_run;
            if deadline <= Instant::now() {
                return store.pop();
            }
            let _ = self.due.wait_until(&mut store, deadline);
        }
    }

    fn run(&self, mut entry: ScheduledTask<T>) {
        match entry.mode {
            RepeatMode::Once => entry.task.run(),
            RepeatMode::FixedRate => {
                let outcome = catch_unwind(AssertUnwindSafe(|| entry.task.clone().run()));
                entry.next_run += entry.period;
                self.reinsert(entry);
                if let Err(payload) = outcome {
                    resume_unwind(payload);
                }
            }
            RepeatMode::FixedDelay => {
                let outcome = catch_unwind(AssertUnwindSafe(|| entry.task.clone().run()));
                entry.next_run = Instant::now() + entry.period;
                self.reinsert(entry);
                if let Err(payload) = outcome {
                    resume_unwind(payload);
                }
            }
        }
    }

    fn on_stop(&self) {
        // Lock so a worker between its running check and the wait cannot
        // miss the shutdown wakeup.
        let _store = self.store.lock();
        self.due.notify_all();
    }
}

/// Worker pool running tasks at deadlines, with optional re-arming.
///
/// Repeating entries are discarded on [`stop`](ScheduledPool::stop); the
/// payload is cloned once per repeat run, which is why `T: Clone`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use threadkit::ScheduledPool;
///
/// let pool: ScheduledPool<fn()> = ScheduledPool::new(1);
/// pool.start();
/// pool.execute(Duration::from_millis(10), || println!("ten ms later"));
/// pool.execute_with_fixed_rate(
///     Duration::ZERO,
///     Duration::from_millis(5),
///     || println!("every five ms"),
/// );
/// # std::thread::sleep(Duration::from_millis(30));
/// pool.stop();
/// ```
pub struct ScheduledPool<T: Runnable + Clone> {
    pool: WorkerPool<ScheduledSource<T>>,
}

impl<T: Runnable + Clone> ScheduledPool<T> {
    /// Creates a stopped pool with `workers` threads.
    pub fn new(workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(
                workers,
                ScheduledSource {
                    store: Mutex::new(BinaryHeap::new()),
                    due: Condvar::new(),
                },
            ),
        }
    }

    /// Spawns the workers; returns once all are up. Idempotent.
    pub fn start(&self) {
        self.pool.start();
    }

    /// Stops and joins the workers, discarding every pending entry's next
    /// run. Idempotent.
    pub fn stop(&self) {
        self.pool.stop();
    }

    /// Schedules one run at `now + delay`.
    pub fn execute(&self, delay: Duration, task: T) {
        self.schedule(delay, Duration::ZERO, RepeatMode::Once, task);
    }

    /// Schedules repeated runs: first at `now + initial_delay`, then at
    /// fixed multiples of `period` from that point, regardless of how long
    /// each run takes.
    pub fn execute_with_fixed_rate(&self, initial_delay: Duration, period: Duration, task: T) {
        self.schedule(initial_delay, period, RepeatMode::FixedRate, task);
    }

    /// Schedules repeated runs: first at `now + initial_delay`, then
    /// `period` after each run **completes**.
    pub fn execute_with_fixed_delay(&self, initial_delay: Duration, period: Duration, task: T) {
        self.schedule(initial_delay, period, RepeatMode::FixedDelay, task);
    }

    fn schedule(&self, delay: Duration, period: Duration, mode: RepeatMode, task: T) {
        self.pool.source().insert(ScheduledTask {
            next_run: Instant::now() + delay,
            period,
            mode,
            task,
        });
    }

    /// Number of entries currently waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.pool.source().store.lock().len()
    }

    /// `true` between a completed `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }
}
