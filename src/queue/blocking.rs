//! # Thread-safe queue with blocking and non-blocking accessors.
//!
//! [`BlockingQueue`] wraps a [`Backing`] store behind one mutex and one
//! condition variable. Three access families mirror the three ways callers
//! want to observe emptiness:
//!
//! - **Strict** — [`remove`](BlockingQueue::remove) /
//!   [`element`](BlockingQueue::element): `Err(QueueError::Empty)` when
//!   there is nothing to return.
//! - **Nullable** — [`poll`](BlockingQueue::poll) /
//!   [`peek`](BlockingQueue::peek): `None` when empty, never an error.
//! - **Blocking** — [`take`](BlockingQueue::take): suspends the caller until
//!   an element arrives, blocking is disabled, or the caller's stop
//!   predicate turns true.
//!
//! ## Rules
//! - Inserts (`add`/`put`/`offer`) never block and wake exactly one waiter.
//! - One mutex guards the backing store; the reported size always matches it.
//! - [`interrupt_blocking`](BlockingQueue::interrupt_blocking) and
//!   [`set_allow_blocking`](BlockingQueue::set_allow_blocking)`(false)` wake
//!   **all** waiters so every suspended `take` re-evaluates its exit
//!   condition.
//! - The queue is unbounded; growth is the caller's concern.

use parking_lot::{Condvar, Mutex};

use crate::error::QueueError;

use super::backing::{Array, Backing, Linked, Priority};

/// FIFO queue with O(1) insert/remove. The default choice for work queues.
pub type LinkedBlockingQueue<T> = BlockingQueue<T, Linked<T>>;

/// FIFO queue over contiguous storage (O(n) remove due to the front shift).
pub type ArrayBlockingQueue<T> = BlockingQueue<T, Array<T>>;

/// Queue returning the highest-priority element first per `T: Ord`.
///
/// The tie-break among equal-priority elements is unspecified.
pub type PriorityBlockingQueue<T> = BlockingQueue<T, Priority<T>>;

/// Thread-safe sequence with blocking and non-blocking accessors.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct BlockingQueue<T, B: Backing<T>> {
    inner: Mutex<Inner<T, B>>,
    available: Condvar,
}

struct Inner<T, B: Backing<T>> {
    data: B,
    allow_blocking: bool,
    _marker: std::marker::PhantomData<T>,
}

impl<T, B: Backing<T>> Default for BlockingQueue<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B: Backing<T>> BlockingQueue<T, B> {
    /// Creates an empty queue with blocking enabled.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                data: B::default(),
                allow_blocking: true,
                _marker: std::marker::PhantomData,
            }),
            available: Condvar::new(),
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    /// `true` when no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an element. Never blocks; wakes one waiter.
    pub fn add(&self, item: T) {
        let mut inner = self.inner.lock();
        inner.data.push(item);
        self.available.notify_one();
    }

    /// Inserts an element. Alias of [`add`](Self::add) for producer code
    /// written against the blocking family.
    pub fn put(&self, item: T) {
        self.add(item);
    }

    /// Inserts an element, reporting acceptance. The queue is unbounded, so
    /// this always returns `true`.
    pub fn offer(&self, item: T) -> bool {
        self.add(item);
        true
    }

    /// Removes and returns the next element.
    ///
    /// # Errors
    /// [`QueueError::Empty`] when the queue holds no elements.
    pub fn remove(&self) -> Result<T, QueueError> {
        self.inner.lock().data.pop().ok_or(QueueError::Empty)
    }

    /// Returns the next element without removing it.
    ///
    /// # Errors
    /// [`QueueError::Empty`] when the queue holds no elements.
    pub fn element(&self) -> Result<T, QueueError>
    where
        T: Clone,
    {
        self.inner.lock().data.front().cloned().ok_or(QueueError::Empty)
    }

    /// Removes and returns the next element, `None` when empty.
    pub fn poll(&self) -> Option<T> {
        self.inner.lock().data.pop()
    }

    /// Returns the next element without removing it, `None` when empty.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.inner.lock().data.front().cloned()
    }

    /// Removes and returns the next element, suspending the caller while the
    /// queue is empty.
    ///
    /// Returns immediately when the queue is non-empty, blocking is
    /// disabled, or `stop_blocking()` is already `true`. Otherwise waits on
    /// the internal condition, re-evaluating `stop_blocking()` on every wake
    /// (spurious wakeups included), until an element arrives, blocking is
    /// disabled, or the predicate turns true.
    ///
    /// Returns `None` only when woken with the queue still empty.
    pub fn take(&self, stop_blocking: impl Fn() -> bool) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.allow_blocking && inner.data.is_empty() && !stop_blocking() {
            self.available.wait(&mut inner);
        }
        inner.data.pop()
    }

    /// Enables or disables blocking. Disabling wakes every suspended
    /// [`take`](Self::take) so it can return with whatever is available.
    pub fn set_allow_blocking(&self, allow_blocking: bool) {
        let mut inner = self.inner.lock();
        inner.allow_blocking = allow_blocking;
        drop(inner);
        self.available.notify_all();
    }

    /// Wakes every suspended [`take`](Self::take) without changing state.
    ///
    /// Each woken taker re-evaluates its stop predicate; takers whose
    /// predicate is still false and whose queue is still empty go back to
    /// sleep.
    pub fn interrupt_blocking(&self) {
        // Hold the lock so a taker between its predicate check and the wait
        // cannot miss this wakeup.
        let _inner = self.inner.lock();
        self.available.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn strict_nullable_blocking_contract<B: Backing<&'static str>>(q: &BlockingQueue<&'static str, B>) {
        // strict accessors
        q.add("EXC");
        assert_eq!(q.len(), 1);
        assert!(!q.is_empty());
        assert_eq!(q.element(), Ok("EXC"));
        assert_eq!(q.remove(), Ok("EXC"));
        assert_eq!(q.element(), Err(QueueError::Empty));
        assert_eq!(q.remove(), Err(QueueError::Empty));
        assert!(q.is_empty());

        // nullable accessors
        assert!(q.offer("SV"));
        assert_eq!(q.peek(), Some("SV"));
        assert_eq!(q.poll(), Some("SV"));
        assert_eq!(q.peek(), None);
        assert_eq!(q.poll(), None);
        assert!(q.is_empty());

        // non-empty take returns without blocking
        q.put("BLK");
        assert_eq!(q.take(|| false), Some("BLK"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_linked_queue_contract() {
        strict_nullable_blocking_contract(&LinkedBlockingQueue::new());
    }

    #[test]
    fn test_array_queue_contract() {
        strict_nullable_blocking_contract(&ArrayBlockingQueue::new());
    }

    #[test]
    fn test_priority_queue_contract() {
        strict_nullable_blocking_contract(&PriorityBlockingQueue::new());
    }

    #[test]
    fn test_fifo_order_preserved() {
        let q = LinkedBlockingQueue::new();
        for i in 0..100 {
            q.add(i);
        }
        for i in 0..100 {
            assert_eq!(q.poll(), Some(i));
        }
    }

    #[test]
    fn test_priority_returns_max_first() {
        let q = PriorityBlockingQueue::new();
        for i in [3, 1, 4, 1, 5, 9, 2, 6] {
            q.add(i);
        }
        let mut drained = Vec::new();
        while let Some(v) = q.poll() {
            drained.push(v);
        }
        assert_eq!(drained, vec![9, 6, 5, 4, 3, 2, 1, 1]);
    }

    #[test]
    fn test_take_blocks_until_insert() {
        let q = Arc::new(LinkedBlockingQueue::new());
        q.put(1u32);

        let taker = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                let first = q.take(|| false);
                let second = q.take(|| false);
                (first, second)
            })
        };

        // second take has nothing yet; give the taker time to suspend
        thread::sleep(Duration::from_millis(20));
        q.put(2u32);

        let (first, second) = taker.join().unwrap();
        assert_eq!(first, Some(1));
        assert_eq!(second, Some(2));
    }

    #[test]
    fn test_disabling_blocking_unblocks_taker() {
        let q = Arc::new(LinkedBlockingQueue::<u32>::new());
        let taker = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.take(|| false))
        };
        thread::sleep(Duration::from_millis(20));
        q.set_allow_blocking(false);
        assert_eq!(taker.join().unwrap(), None);

        // with blocking disabled, take never suspends
        assert_eq!(q.take(|| false), None);
        q.add(7);
        assert_eq!(q.take(|| false), Some(7));
    }

    #[test]
    fn test_interrupt_with_true_predicate_unblocks_taker() {
        let q = Arc::new(LinkedBlockingQueue::<u32>::new());
        let stop = Arc::new(AtomicBool::new(false));

        let taker = {
            let q = Arc::clone(&q);
            let stop = Arc::clone(&stop);
            thread::spawn(move || q.take(|| stop.load(Ordering::Acquire)))
        };

        thread::sleep(Duration::from_millis(20));
        // interrupt alone must not release the taker: predicate still false
        q.interrupt_blocking();
        thread::sleep(Duration::from_millis(20));
        assert!(!taker.is_finished());

        stop.store(true, Ordering::Release);
        q.interrupt_blocking();
        assert_eq!(taker.join().unwrap(), None);
    }

    #[test]
    fn test_take_with_already_true_predicate_and_element() {
        let q = LinkedBlockingQueue::new();
        q.add(42u32);
        // predicate already true + non-empty: returns the element immediately
        assert_eq!(q.take(|| true), Some(42));
        // predicate already true + empty: returns None immediately
        assert_eq!(q.take(|| true), None);
    }
}
