//! Trace id allocation.
//!
//! Only a handful of traces exist per session, so ids are plain sequential
//! numbers. An id is never handed out twice, even after its trace is deleted.

use std::collections::BTreeMap;

use crate::data::channel::ChannelKey;
use crate::data::sample::Sample;

/// Numeric identifier of a plot trace, unique across the whole workspace.
pub type TraceId = u64;

/// Sole issuer of [`TraceId`]s. Starts at 0 and only ever counts up.
///
/// All callers live on the UI event loop, so a plain counter is enough.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: TraceId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh id.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> TraceId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> TraceId {
        self.next
    }

    /// Assign one primary id per channel of a freshly parsed sample.
    ///
    /// Order is fixed: `timestamp_diffs`, then `latencies` when present, then
    /// the numbered data channels in ascending order.
    pub fn assign_sample(&mut self, sample: &Sample) -> BTreeMap<ChannelKey, TraceId> {
        let mut ids = BTreeMap::new();
        ids.insert(ChannelKey::TimestampDiffs, self.next());
        if sample.latencies.is_some() {
            ids.insert(ChannelKey::Latencies, self.next());
        }
        for key in sample.data.keys() {
            ids.insert(*key, self.next());
        }
        ids
    }
}
