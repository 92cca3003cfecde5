//! # Worker pool core: N persistent threads over a pluggable task source.
//!
//! [`WorkerPool`] owns the threads and the lifecycle; a [`TaskSource`]
//! decides where tasks come from and how one task is executed. The two FIFO
//! and scheduled pools in this crate are thin wrappers plugging their own
//! source into this core.
//!
//! ## Lifecycle
//! ```text
//! start()                       stop()
//!   │ admission lock              │ admission lock
//!   │ spawn N workers             │ running := false
//!   │ wait ready == N             │ source.on_stop()  (wakes blocked next())
//!   ▼                             │ wait ready == 0
//! Running ──────────────────────► │ join every handle
//!                                 ▼
//!                               Stopped
//! ```
//!
//! ## Rules
//! - `start()` and `stop()` are idempotent; both serialize on the admission
//!   lock, which is distinct from any task-source lock.
//! - `start()` does not return until all N workers have signaled readiness.
//! - `stop()` does not return until all N workers have exited and joined.
//!   It must not be called from a worker of the same pool (self-join).
//! - Workers run tasks with no lock held; fetching and executing are the
//!   source's concern.
//! - A panicking task is caught and logged; the worker stays in rotation.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::error::panic_message;

/// One unit of work, consumed by execution.
///
/// Blanket-implemented for every `FnOnce() + Send + 'static`, so plain
/// closures (and `Box<dyn FnOnce() + Send>`) are runnable as-is.
pub trait Runnable: Send + 'static {
    /// Executes the task, consuming it.
    fn run(self);
}

impl<F: FnOnce() + Send + 'static> Runnable for F {
    fn run(self) {
        self()
    }
}

/// Per-pool retrieval strategy: where tasks come from and how one runs.
///
/// The pool calls [`next`](TaskSource::next) and [`run`](TaskSource::run) in
/// a loop from every worker; re-arming of repeating tasks belongs inside
/// `run`, after the task body completes.
pub trait TaskSource: Send + Sync + 'static {
    /// The unit of work handed from `next` to `run`.
    type Task: Send;

    /// Retrieves one task, blocking until one is available or `running`
    /// turns false. Returns `None` when woken for shutdown.
    fn next(&self, running: &AtomicBool) -> Option<Self::Task>;

    /// Executes one task synchronously on the calling worker.
    fn run(&self, task: Self::Task);

    /// Called under the admission lock before workers spawn.
    fn on_start(&self) {}

    /// Called under the admission lock after `running` is cleared; must wake
    /// every blocked [`next`](TaskSource::next).
    fn on_stop(&self) {}
}

/// Counts workers that are up; start/stop block on it.
struct ReadyLatch {
    count: Mutex<usize>,
    changed: Condvar,
}

impl ReadyLatch {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
            changed: Condvar::new(),
        }
    }

    fn arrive(&self) {
        *self.count.lock() += 1;
        self.changed.notify_all();
    }

    fn depart(&self) {
        *self.count.lock() -= 1;
        self.changed.notify_all();
    }

    fn wait_for(&self, target: usize) {
        let mut count = self.count.lock();
        while *count != target {
            self.changed.wait(&mut count);
        }
    }
}

/// Fixed-size pool of persistent worker threads.
pub struct WorkerPool<S: TaskSource> {
    source: Arc<S>,
    workers: usize,
    running: Arc<AtomicBool>,
    ready: Arc<ReadyLatch>,
    /// Admission gate: serializes start/stop and owns the thread handles.
    /// Non-empty means started.
    admission: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: TaskSource> WorkerPool<S> {
    /// Creates a stopped pool of `workers` threads over `source`.
    pub fn new(workers: usize, source: S) -> Self {
        Self {
            source: Arc::new(source),
            workers,
            running: Arc::new(AtomicBool::new(false)),
            ready: Arc::new(ReadyLatch::new()),
            admission: Mutex::new(Vec::new()),
        }
    }

    /// The pool's task source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// `true` between a completed `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawns the workers. Idempotent; when it returns, all workers are up.
    pub fn start(&self) {
        let mut handles = self.admission.lock();
        if !handles.is_empty() {
            return;
        }

        self.running.store(true, Ordering::Release);
        self.source.on_start();

        for _ in 0..self.workers {
            let source = Arc::clone(&self.source);
            let running = Arc::clone(&self.running);
            let ready = Arc::clone(&self.ready);
            handles.push(thread::spawn(move || {
                ready.arrive();
                while running.load(Ordering::Acquire) {
                    if let Some(task) = source.next(&running) {
                        // A panicking task must not take the worker down with
                        // it; the thread stays in rotation for the next task.
                        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| source.run(task))) {
                            error!(reason = panic_message(&payload), "task panicked on worker");
                        }
                    }
                }
                ready.depart();
            }));
        }

        self.ready.wait_for(self.workers);
        debug!(workers = self.workers, "worker pool started");
    }

    /// Stops the workers. Idempotent; when it returns, all workers have
    /// exited and been joined.
    ///
    /// Must not be called from a thread running on this pool.
    pub fn stop(&self) {
        let mut handles = self.admission.lock();
        if handles.is_empty() {
            return;
        }

        self.running.store(false, Ordering::Release);
        self.source.on_stop();
        self.ready.wait_for(0);

        for handle in handles.drain(..) {
            let _ = handle.join();
        }
        debug!(workers = self.workers, "worker pool stopped");
    }
}

impl<S: TaskSource> Drop for WorkerPool<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Source that hands out a fixed value whenever the pool is running and
    /// counts executions. `next` sleeps briefly to avoid a hot loop.
    struct CountingSource {
        executed: AtomicUsize,
    }

    impl TaskSource for CountingSource {
        type Task = ();

        fn next(&self, running: &AtomicBool) -> Option<()> {
            thread::sleep(Duration::from_millis(1));
            running.load(Ordering::Acquire).then_some(())
        }

        fn run(&self, _task: ()) {
            self.executed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn counting_pool(workers: usize) -> WorkerPool<CountingSource> {
        WorkerPool::new(
            workers,
            CountingSource {
                executed: AtomicUsize::new(0),
            },
        )
    }

    #[test]
    fn test_start_returns_fully_staffed() {
        let pool = counting_pool(4);
        pool.start();
        assert!(pool.is_running());
        assert_eq!(*pool.ready.count.lock(), 4);
        pool.stop();
        assert_eq!(*pool.ready.count.lock(), 0);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let pool = counting_pool(2);
        pool.start();
        pool.start();
        assert_eq!(pool.admission.lock().len(), 2);
        pool.stop();
        pool.stop();
        assert!(pool.admission.lock().is_empty());
        assert!(!pool.is_running());
    }

    #[test]
    fn test_workers_pull_and_execute() {
        let pool = counting_pool(2);
        pool.start();
        thread::sleep(Duration::from_millis(30));
        pool.stop();
        assert!(pool.source().executed.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_restart_after_stop() {
        let pool = counting_pool(1);
        pool.start();
        pool.stop();
        let before = pool.source().executed.load(Ordering::Relaxed);
        pool.start();
        thread::sleep(Duration::from_millis(20));
        pool.stop();
        assert!(pool.source().executed.load(Ordering::Relaxed) > before);
    }
}
