//! Blocking collections: one synchronized queue wrapper, three orderings.

mod backing;
mod blocking;

pub use backing::{Array, Backing, Linked, Priority};
pub use blocking::{
    ArrayBlockingQueue, BlockingQueue, LinkedBlockingQueue, PriorityBlockingQueue,
};
