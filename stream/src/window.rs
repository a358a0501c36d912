use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use corelib::SampleRecord;
use serde::{Serialize, Serializer};

pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded FIFO buffer of the most recent samples, in arrival order.
///
/// Capacity is enforced on every push, so an append costs the same whether
/// the window is empty or full. Records are stored behind `Arc` so that
/// snapshots share them instead of copying.
#[derive(Debug)]
pub struct SampleWindow {
    records: VecDeque<Arc<SampleRecord>>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push `record` at the tail, evicting from the head to stay within
    /// capacity. Returns the evicted record, if any.
    pub fn append(&mut self, record: SampleRecord) -> Option<Arc<SampleRecord>> {
        let mut evicted = None;
        while self.records.len() >= self.capacity {
            evicted = self.records.pop_front();
        }
        self.records.push_back(Arc::new(record));
        evicted
    }

    /// Current contents, oldest first. Later appends never show through.
    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            records: self.records.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&SampleRecord> {
        self.records.back().map(Arc::as_ref)
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable, cheaply clonable view of a [`SampleWindow`] at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSnapshot {
    records: Arc<[Arc<SampleRecord>]>,
}

/// Aggregate of one channel across a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub latest: f64,
}

impl WindowSnapshot {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleRecord> {
        self.records.iter().map(Arc::as_ref)
    }

    pub fn first(&self) -> Option<&SampleRecord> {
        self.records.first().map(Arc::as_ref)
    }

    pub fn last(&self) -> Option<&SampleRecord> {
        self.records.last().map(Arc::as_ref)
    }

    /// Union of channel names across all records, sorted.
    pub fn channel_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.iter().flat_map(|r| r.channel_names()).collect();
        names.into_iter().collect()
    }

    /// `(formatted timestamp, reading)` points for one channel, oldest first.
    /// Records without the channel are skipped.
    pub fn series(&self, channel: &str) -> Vec<(&str, f64)> {
        self.iter()
            .filter_map(|r| r.channel(channel).map(|v| (r.formatted_timestamp(), v)))
            .collect()
    }

    pub fn summary(&self, channel: &str) -> Option<ChannelSummary> {
        let mut values = self.iter().filter_map(|r| r.channel(channel));
        let first = values.next()?;

        let mut s = ChannelSummary {
            count: 1,
            min: first,
            max: first,
            mean: 0.0,
            latest: first,
        };
        let mut sum = first;

        for v in values {
            s.count += 1;
            s.min = s.min.min(v);
            s.max = s.max.max(v);
            s.latest = v;
            sum += v;
        }
        s.mean = sum / s.count as f64;

        Some(s)
    }
}

impl Serialize for WindowSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
