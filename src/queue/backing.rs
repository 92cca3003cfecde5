//! Backing stores for [`BlockingQueue`](super::BlockingQueue).
//!
//! A backing decides *order*; the queue wrapper decides *synchronization*.
//! Three orders are provided:
//! - [`Linked`] — FIFO over a `VecDeque`, O(1) push/pop.
//! - [`Array`] — FIFO over a `Vec`, O(n) pop (front shift).
//! - [`Priority`] — max-first over a `BinaryHeap` per `T: Ord`.

use std::collections::{BinaryHeap, VecDeque};

/// Ordered storage behind a blocking queue.
///
/// Implementations are not synchronized; the owning queue serializes every
/// call under its mutex.
pub trait Backing<T>: Default {
    /// Inserts one element at its ordered position.
    fn push(&mut self, item: T);
    /// Removes and returns the next element, `None` when empty.
    fn pop(&mut self) -> Option<T>;
    /// Returns the next element without removing it.
    fn front(&self) -> Option<&T>;
    /// Number of stored elements.
    fn len(&self) -> usize;
    /// `true` when no elements are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// FIFO backing with O(1) insert and remove.
pub struct Linked<T> {
    data: VecDeque<T>,
}

impl<T> Default for Linked<T> {
    fn default() -> Self {
        Self {
            data: VecDeque::new(),
        }
    }
}

impl<T> Backing<T> for Linked<T> {
    fn push(&mut self, item: T) {
        self.data.push_back(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.data.pop_front()
    }

    fn front(&self) -> Option<&T> {
        self.data.front()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// FIFO backing over contiguous storage; removal shifts the tail down.
pub struct Array<T> {
    data: Vec<T>,
}

impl<T> Default for Array<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T> Backing<T> for Array<T> {
    fn push(&mut self, item: T) {
        self.data.push(item);
    }

    fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            None
        } else {
            Some(self.data.remove(0))
        }
    }

    fn front(&self) -> Option<&T> {
        self.data.first()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// Max-first backing; `pop` returns the greatest remaining element.
///
/// Ties among equal elements come back in heap order, which is not stable —
/// do not rely on insertion order between equals.
pub struct Priority<T: Ord> {
    data: BinaryHeap<T>,
}

impl<T: Ord> Default for Priority<T> {
    fn default() -> Self {
        Self {
            data: BinaryHeap::new(),
        }
    }
}

impl<T: Ord> Backing<T> for Priority<T> {
    fn push(&mut self, item: T) {
        self.data.push(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    fn front(&self) -> Option<&T> {
        self.data.peek()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_is_fifo() {
        let mut b = Linked::default();
        assert!(b.is_empty());
        b.push(1);
        b.push(2);
        b.push(3);
        assert_eq!(b.front(), Some(&1));
        assert!(!b.is_empty());
        assert_eq!(b.pop(), Some(1));
        assert_eq!(b.pop(), Some(2));
        assert_eq!(b.pop(), Some(3));
        assert_eq!(b.pop(), None);
        assert!(b.is_empty());
    }

    #[test]
    fn test_array_is_fifo() {
        let mut b = Array::default();
        b.push("a");
        b.push("b");
        assert_eq!(b.pop(), Some("a"));
        b.push("c");
        assert_eq!(b.pop(), Some("b"));
        assert_eq!(b.pop(), Some("c"));
        assert_eq!(b.pop(), None);
    }

    #[test]
    fn test_priority_is_max_first() {
        let mut b = Priority::default();
        b.push(5);
        b.push(9);
        b.push(1);
        b.push(7);
        assert_eq!(b.front(), Some(&9));
        assert_eq!(b.pop(), Some(9));
        assert_eq!(b.pop(), Some(7));
        assert_eq!(b.pop(), Some(5));
        assert_eq!(b.pop(), Some(1));
        assert_eq!(b.pop(), None);
    }
}
