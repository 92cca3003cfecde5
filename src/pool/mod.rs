//! Worker pools: persistent threads over pluggable task sources.

mod core;
mod fifo;
mod scheduled;

pub use self::core::{Runnable, TaskSource, WorkerPool};
pub use fifo::FifoPool;
pub use scheduled::{RepeatMode, ScheduledPool};
