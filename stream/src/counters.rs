use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Minimal counters for operational visibility.
#[derive(Clone, Default, Debug)]
pub struct StreamCounters {
    pub attempts: Arc<AtomicU64>,
    pub opened: Arc<AtomicU64>,
    pub closed: Arc<AtomicU64>,

    pub frames_received: Arc<AtomicU64>,
    pub samples_appended: Arc<AtomicU64>,
    pub evictions: Arc<AtomicU64>,

    // dropped work
    pub decode_failures: Arc<AtomicU64>,
    pub stale_events: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    pub attempts: u64,
    pub opened: u64,
    pub closed: u64,
    pub frames_received: u64,
    pub samples_appended: u64,
    pub evictions: u64,
    pub decode_failures: u64,
    pub stale_events: u64,
}

impl StreamCounters {
    pub fn snapshot(&self) -> CountersSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        CountersSnapshot {
            attempts: load(&self.attempts),
            opened: load(&self.opened),
            closed: load(&self.closed),
            frames_received: load(&self.frames_received),
            samples_appended: load(&self.samples_appended),
            evictions: load(&self.evictions),
            decode_failures: load(&self.decode_failures),
            stale_events: load(&self.stale_events),
        }
    }
}

pub(crate) fn incr(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
