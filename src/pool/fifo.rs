//! # FIFO worker pool: submit-and-forget execution in submission order.
//!
//! [`FifoPool`] plugs a [`LinkedBlockingQueue`] into the
//! [`WorkerPool`](super::WorkerPool) core. [`execute`](FifoPool::execute) is
//! a non-blocking offer; idle workers block in the queue's `take` and are
//! released on [`stop`](FifoPool::stop) by disabling blocking on the queue.
//!
//! With a single worker, tasks run strictly in submission order.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::queue::LinkedBlockingQueue;

use super::core::{Runnable, TaskSource, WorkerPool};

struct FifoSource<T> {
    queue: LinkedBlockingQueue<T>,
}

impl<T: Runnable> TaskSource for FifoSource<T> {
    type Task = T;

    fn next(&self, running: &AtomicBool) -> Option<T> {
        self.queue.take(|| !running.load(Ordering::Acquire))
    }

    fn run(&self, task: T) {
        task.run();
    }

    fn on_start(&self) {
        self.queue.set_allow_blocking(true);
    }

    fn on_stop(&self) {
        // Unblocks every worker pending in take; queued tasks left behind
        // stay queued for a later start.
        self.queue.set_allow_blocking(false);
    }
}

/// Worker pool executing submitted tasks in FIFO order.
///
/// # Example
/// ```
/// use threadkit::FifoPool;
///
/// let pool = FifoPool::new(1);
/// pool.start();
/// pool.execute(|| println!("ran on a worker"));
/// pool.stop();
/// ```
pub struct FifoPool<T: Runnable> {
    pool: WorkerPool<FifoSource<T>>,
}

impl<T: Runnable> FifoPool<T> {
    /// Creates a stopped pool with `workers` threads.
    pub fn new(workers: usize) -> Self {
        Self {
            pool: WorkerPool::new(
                workers,
                FifoSource {
                    queue: LinkedBlockingQueue::new(),
                },
            ),
        }
    }

    /// Spawns the workers; returns once all are up. Idempotent.
    pub fn start(&self) {
        self.pool.start();
    }

    /// Stops and joins the workers. Idempotent.
    pub fn stop(&self) {
        self.pool.stop();
    }

    /// Submits one task. Never blocks; a worker picks it up in FIFO order.
    pub fn execute(&self, task: T) {
        self.pool.source().queue.offer(task);
    }

    /// Number of submitted tasks not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.pool.source().queue.len()
    }

    /// `true` between a completed `start()` and the next `stop()`.
    pub fn is_running(&self) -> bool {
        self.pool.is_running()
    }
}
