//! # Typed handler registry with safe type erasure.
//!
//! Handler lists are keyed by [`TypeId`] and stored behind `dyn Any`, so
//! looking a type up involves no unsafe punning: subscribe downcasts under
//! the registry write lock, broadcast under the read lock. Register-or-fetch
//! for a brand-new type happens entirely under the write lock, so the first
//! subscription for a type and a concurrent broadcast of that type cannot
//! race.
//!
//! ## Rules
//! - Handler order within one type is subscription order.
//! - Distinct types are fully independent.
//! - A handler panic is caught at the invocation boundary, logged once with
//!   the event-type and handler names, and never reaches siblings.
//! - Latency is recorded per (event type, handler); a panicking run records
//!   nothing.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::error;

use crate::error::panic_message;

use super::timing::InvocationStats;

/// One named subscription: callback plus its latency record.
pub(crate) struct Handler<E> {
    stats: Arc<InvocationStats>,
    callback: Box<dyn Fn(&E) + Send + Sync>,
}

impl<E> Handler<E> {
    /// Runs the callback with panic containment and latency accounting.
    pub(crate) fn invoke(&self, event: &E) {
        let begin = Instant::now();
        match catch_unwind(AssertUnwindSafe(|| (self.callback)(event))) {
            Ok(()) => self.stats.record(begin.elapsed().as_nanos() as u64),
            Err(payload) => {
                error!(
                    event = self.stats.event,
                    handler = %self.stats.handler,
                    reason = panic_message(&payload),
                    "handler panicked while handling event",
                );
            }
        }
    }
}

/// Per-type handler list, stored type-erased in the registry.
struct HandlerList<E> {
    entries: Vec<Arc<Handler<E>>>,
}

/// Type-keyed handler registry shared by subscribe and broadcast.
#[derive(Default)]
pub(crate) struct Registry {
    types: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    /// Flat view over every handler's latency record, in subscription order.
    stats: Mutex<Vec<Arc<InvocationStats>>>,
}

impl Registry {
    /// Appends a named handler to `E`'s list, creating the list on first
    /// subscription for the type.
    pub(crate) fn subscribe<E, F>(&self, name: String, callback: F)
    where
        E: 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let stats = Arc::new(InvocationStats::new(std::any::type_name::<E>(), name));
        let handler = Arc::new(Handler {
            stats: Arc::clone(&stats),
            callback: Box::new(callback),
        });

        let mut types = self.types.write();
        let list = types
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(HandlerList::<E> { entries: Vec::new() }));
        if let Some(list) = list.downcast_mut::<HandlerList<E>>() {
            list.entries.push(handler);
        }
        drop(types);

        self.stats.lock().push(stats);
    }

    /// Snapshot of `E`'s handlers in subscription order; empty when the type
    /// has never been subscribed to.
    pub(crate) fn handlers_for<E: 'static>(&self) -> Vec<Arc<Handler<E>>> {
        let types = self.types.read();
        types
            .get(&TypeId::of::<E>())
            .and_then(|list| list.downcast_ref::<HandlerList<E>>())
            .map(|list| list.entries.clone())
            .unwrap_or_default()
    }

    /// Snapshot of every latency record.
    pub(crate) fn stats_snapshot(&self) -> Vec<Arc<InvocationStats>> {
        self.stats.lock().clone()
    }
}
