//! Error types used by the toolkit.
//!
//! The surface is deliberately small: the only recoverable error the crate
//! reports through `Result` is [`QueueError`], raised by the strict
//! ("must-succeed") queue accessors. Everything else — handler panics,
//! lifecycle failures inside managed services — is contained at its
//! invocation boundary and logged, never propagated (see
//! [`EventBus`](crate::EventBus) and [`Manager`](crate::Manager)).

use std::any::Any;

use thiserror::Error;

/// # Errors produced by queue accessors.
///
/// Returned by [`BlockingQueue::remove`](crate::BlockingQueue::remove) and
/// [`BlockingQueue::element`](crate::BlockingQueue::element), which require
/// an element to be present. The non-blocking accessors (`poll`, `peek`)
/// model the same condition as `Option` and never fail.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue held no elements at the time of the call.
    #[error("empty queue")]
    Empty,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::Empty => "queue_empty",
        }
    }
}

/// Best-effort text for a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown error"
    }
}
