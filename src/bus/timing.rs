//! Per-(event-type, handler) invocation latency accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running latency total for one (event type, handler) pair.
///
/// Updated lock-free from whatever thread drains the execution queue; read
/// by [`timing_report`](crate::EventBus::timing_report).
pub(crate) struct InvocationStats {
    pub(crate) event: &'static str,
    pub(crate) handler: String,
    total_nanos: AtomicU64,
    runs: AtomicU64,
}

impl InvocationStats {
    pub(crate) fn new(event: &'static str, handler: String) -> Self {
        Self {
            event,
            handler,
            total_nanos: AtomicU64::new(0),
            runs: AtomicU64::new(0),
        }
    }

    pub(crate) fn record(&self, nanos: u64) {
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn average_nanos(&self) -> u64 {
        let runs = self.runs.load(Ordering::Relaxed);
        if runs == 0 {
            0
        } else {
            self.total_nanos.load(Ordering::Relaxed) / runs
        }
    }
}

/// Renders all records sorted by descending average latency; ties break by
/// handler name, then event-type name. Columns align on the longest
/// event-plus-handler pair.
pub(crate) fn render_report(stats: &[Arc<InvocationStats>]) -> String {
    let mut records: Vec<(&'static str, &str, u64)> = stats
        .iter()
        .map(|s| (s.event, s.handler.as_str(), s.average_nanos()))
        .collect();
    records.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| a.1.cmp(b.1))
            .then_with(|| a.0.cmp(b.0))
    });

    let width = records
        .iter()
        .map(|(event, handler, _)| event.len() + handler.len() + 1)
        .max()
        .unwrap_or(1);

    let mut out = String::from("Handler timing:\n");
    for (event, handler, avg) in records {
        let pad = width - event.len() - 1;
        out.push_str(&format!(
            "        {event} {handler:<pad$}   {:.3}us\n",
            avg as f64 / 1000.0,
        ));
    }
    out
}
