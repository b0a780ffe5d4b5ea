use std::collections::HashMap;

use log::trace;
use ordered_float::NotNan;

/// Memo for aggregates that are expensive to recompute.
///
/// Must be invalidated by every mutation of the owning dataset, under the same lock.
#[derive(Debug)]
pub(super) struct StatsCache {
    enabled: bool,
    total_count: Option<u64>,
    sum: Option<f64>,
    bucket_by_rank: HashMap<u64, usize>,
    frequency_by_value: HashMap<NotNan<f64>, u64>,
}

impl StatsCache {
    pub(super) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            total_count: None,
            sum: None,
            bucket_by_rank: HashMap::new(),
            frequency_by_value: HashMap::new(),
        }
    }

    pub(super) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(super) fn is_empty(&self) -> bool {
        self.total_count.is_none()
            && self.sum.is_none()
            && self.bucket_by_rank.is_empty()
            && self.frequency_by_value.is_empty()
    }

    /// Drop everything memoized so far.
    pub(super) fn invalidate(&mut self) {
        if self.is_empty() {
            return;
        }

        trace!(
            "invalidating stats cache ({} ranks, {} frequencies)",
            self.bucket_by_rank.len(),
            self.frequency_by_value.len()
        );
        self.total_count = None;
        self.sum = None;
        self.bucket_by_rank.clear();
        self.frequency_by_value.clear();
    }

    pub(super) fn total_count<F>(&mut self, compute: F) -> u64
    where
        F: FnOnce() -> u64,
    {
        if let Some(n) = self.total_count {
            return n;
        }
        let n = compute();
        if self.enabled {
            self.total_count = Some(n);
        }
        n
    }

    pub(super) fn sum<F>(&mut self, compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        if let Some(s) = self.sum {
            return s;
        }
        let s = compute();
        if self.enabled {
            self.sum = Some(s);
        }
        s
    }

    /// Lookups that found no bucket are not memoized.
    pub(super) fn bucket<F>(&mut self, rank: u64, compute: F) -> Option<usize>
    where
        F: FnOnce() -> Option<usize>,
    {
        if let Some(idx) = self.bucket_by_rank.get(&rank) {
            return Some(*idx);
        }
        trace!("bucket cache miss for rank {}", rank);
        let idx = compute()?;
        if self.enabled {
            self.bucket_by_rank.insert(rank, idx);
        }
        Some(idx)
    }

    pub(super) fn frequency<F>(&mut self, value: NotNan<f64>, compute: F) -> u64
    where
        F: FnOnce() -> u64,
    {
        if let Some(f) = self.frequency_by_value.get(&value) {
            return *f;
        }
        let f = compute();
        if self.enabled {
            self.frequency_by_value.insert(value, f);
        }
        f
    }
}
