//! Dataset implementation.
use std::collections::HashSet;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use ordered_float::NotNan;

use crate::error::StatsError;
use crate::summary::Summary;

mod cache;

use self::cache::StatsCache;

/// Inner data structure for the dataset, guarded by the lock of [`Dataset`].
#[derive(Debug)]
struct DatasetInner {
    values: Vec<NotNan<f64>>,
    frequencies: Vec<u64>,
    membership: HashSet<NotNan<f64>>,
    cache: StatsCache,
}

impl DatasetInner {
    fn new(cache_enabled: bool) -> Self {
        Self {
            values: vec![],
            frequencies: vec![],
            membership: HashSet::new(),
            cache: StatsCache::new(cache_enabled),
        }
    }

    fn insert(&mut self, value: f64) -> Result<(), StatsError> {
        if !value.is_finite() {
            return Err(StatsError::NonFinite(value));
        }
        let value = NotNan::new(value).map_err(|_| StatsError::NonFinite(value))?;

        self.cache.invalidate();

        if self.membership.contains(&value) {
            let idx = self.values.partition_point(|v| *v < value);
            self.frequencies[idx] += 1;
        } else {
            // first element strictly greater, or the end
            let idx = self.values.partition_point(|v| *v <= value);
            debug!("new unique value {} at index {}", value, idx);
            self.values.insert(idx, value);
            self.frequencies.insert(idx, 1);
            self.membership.insert(value);
        }

        Ok(())
    }

    fn frequency_of(&mut self, value: f64) -> u64 {
        let Ok(value) = NotNan::new(value) else {
            return 0;
        };
        self.cache
            .frequency(value, || match self.values.binary_search(&value) {
                Ok(idx) => self.frequencies[idx],
                Err(_) => 0,
            })
    }

    fn total_count(&mut self) -> u64 {
        self.cache.total_count(|| self.frequencies.iter().sum())
    }

    fn require_non_empty(&mut self) -> Result<u64, StatsError> {
        match self.total_count() {
            0 => Err(StatsError::EmptyDataset),
            n => Ok(n),
        }
    }

    fn value_at(&self, index: usize) -> Result<f64, StatsError> {
        self.values
            .get(index)
            .map(|v| v.into_inner())
            .ok_or(StatsError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            })
    }

    fn sum(&mut self) -> f64 {
        self.cache.sum(|| {
            self.values
                .iter()
                .zip(&self.frequencies)
                .map(|(v, f)| v.into_inner() * (*f as f64))
                .sum()
        })
    }

    fn mean(&mut self) -> Result<f64, StatsError> {
        let n = self.require_non_empty()?;
        Ok(self.sum() / (n as f64))
    }

    fn rank_to_bucket(&mut self, rank: u64) -> Result<usize, StatsError> {
        let total = self.total_count();
        if rank > total {
            return Err(StatsError::RankOutOfRange { rank, total });
        }

        self.cache
            .bucket(rank, || {
                let mut cumulative = 0;
                for (idx, f) in self.frequencies.iter().enumerate() {
                    cumulative += f;
                    if cumulative >= rank {
                        return Some(idx);
                    }
                }
                None
            })
            .ok_or(StatsError::RankOutOfRange { rank, total })
    }

    fn value_at_rank(&mut self, rank: u64) -> Result<f64, StatsError> {
        let idx = self.rank_to_bucket(rank)?;
        self.value_at(idx)
    }

    fn median(&mut self) -> Result<f64, StatsError> {
        let n = self.require_non_empty()?;
        if n % 2 != 0 {
            return self.value_at_rank(n.div_ceil(2));
        }

        let first = self.value_at_rank(n / 2)?;
        let second = self.value_at_rank(n / 2 + 1)?;
        Ok((first + second) / 2.)
    }

    fn percentile(&mut self, p: f64) -> Result<f64, StatsError> {
        if !(0. ..=100.).contains(&p) {
            return Err(StatsError::PercentileOutOfRange(p));
        }
        let n = self.require_non_empty()?;

        let index = (p / 100.) * (n as f64);
        let rank = index.floor() as u64;
        if index.fract() == 0. {
            return self.value_at_rank(rank);
        }

        // average adjacent unique values, not rank-weighted interpolation
        let bucket = self.rank_to_bucket(rank)?;
        let last = self.values.len() - 1;
        let neighbour = if bucket < last {
            bucket + 1
        } else if bucket > 0 {
            bucket - 1
        } else {
            return self.value_at(bucket);
        };
        Ok((self.value_at(neighbour)? + self.value_at(bucket)?) / 2.)
    }

    fn variance(&mut self) -> Result<f64, StatsError> {
        let mean = self.mean()?;
        let n = self.total_count();

        let squared: f64 = self
            .values
            .iter()
            .zip(&self.frequencies)
            .map(|(v, f)| {
                let d = v.into_inner() - mean;
                (*f as f64) * (d * d)
            })
            .sum();
        Ok(squared / (n as f64))
    }

    fn mode(&mut self) -> Result<f64, StatsError> {
        self.require_non_empty()?;

        let mut best = self.value_at(0)?;
        let mut best_frequency = 0;
        for (v, f) in self.values.iter().zip(&self.frequencies) {
            if *f > best_frequency {
                best = v.into_inner();
                best_frequency = *f;
            }
        }
        Ok(best)
    }

    fn count_where<P>(&self, predicate: P) -> u64
    where
        P: Fn(f64) -> bool,
    {
        self.values
            .iter()
            .zip(&self.frequencies)
            .filter(|(v, _f)| predicate(v.into_inner()))
            .map(|(_v, f)| *f)
            .sum()
    }
}

/// A Dataset keeps every observed value of a numeric stream as a `(value, frequency)` pair and
/// derives descriptive statistics from that compressed form.
///
/// # Examples
/// ```
/// use freqstats::dataset::Dataset;
///
/// let dataset = Dataset::new();
/// for x in [9.8, 10.1, 1.1, 0.5, 2.0, 9.8] {
///     dataset.insert(x).unwrap();
/// }
///
/// assert_eq!(dataset.total_count(), 6);
/// assert_eq!(dataset.unique_count(), 5);
/// assert_eq!(dataset.frequency_of(9.8), 2);
/// assert_eq!(dataset.median().unwrap(), 5.9);
/// assert_eq!(dataset.mode().unwrap(), 9.8);
/// ```
///
/// # How It Works
///
/// ## Storage
/// Distinct values are kept in a strictly ascending vector, their occurrence counts in a second
/// vector with the same indices. A hash set answers whether a value was seen before. Memory is
/// therefore `O(unique values)`, independent of how often values repeat.
///
/// ## Insertion
/// A known value only increments its counter. A new value is placed in front of the first
/// stored value that is strictly greater, shifting the tail of both vectors.
///
/// ## Order Statistics
/// A rank (1-based position in the fully expanded, sorted multiset) is mapped to a bucket, the
/// index of the first unique value whose cumulative frequency reaches the rank. Median and
/// percentiles are read from these buckets.
///
/// Percentiles with a fractional rank average the bucket with its next unique value (or the
/// previous one for the last bucket). This is an approximation and not linear interpolation.
///
/// ## Caching
/// Total count, sum, rank to bucket lookups and frequency lookups are memoized until the next
/// insertion. [`Dataset::without_cache`] builds a dataset that recomputes everything; both
/// variants return identical results.
///
/// # Concurrency
/// All operations take `&self` and are serialized by a single lock that is held for the whole
/// operation, so a dataset can be shared between inserting threads, e.g. via `Arc`.
///
/// # See Also
/// - `std::vec::Vec` + `sort`: exact as well, but stores every single observation
pub struct Dataset {
    inner: Mutex<DatasetInner>,
}

impl Dataset {
    /// Create new, empty dataset with caching of derived statistics.
    pub fn new() -> Self {
        Self::with_cache(true)
    }

    /// Create new, empty dataset that recomputes every statistic on demand.
    pub fn without_cache() -> Self {
        Self::with_cache(false)
    }

    fn with_cache(enabled: bool) -> Self {
        Self {
            inner: Mutex::new(DatasetInner::new(enabled)),
        }
    }

    /// Create dataset from the given values.
    ///
    /// Fails on the first non-finite value.
    pub fn from_values<I>(values: I) -> Result<Self, StatsError>
    where
        I: IntoIterator<Item = f64>,
    {
        let dataset = Self::new();
        dataset.try_extend(values)?;
        Ok(dataset)
    }

    fn lock(&self) -> MutexGuard<'_, DatasetInner> {
        // every mutation is applied in full before the guard is released
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Checks whether derived statistics are memoized.
    pub fn is_cache_enabled(&self) -> bool {
        self.lock().cache.is_enabled()
    }

    /// Observe new value.
    ///
    /// NaN and infinities are rejected with [`StatsError::NonFinite`], the dataset stays unchanged
    /// in that case.
    pub fn insert(&self, value: f64) -> Result<(), StatsError> {
        self.lock().insert(value)
    }

    /// Observe all given values while holding the lock once.
    ///
    /// Stops at the first non-finite value; values before it stay inserted.
    pub fn try_extend<I>(&self, values: I) -> Result<(), StatsError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut inner = self.lock();
        for value in values {
            inner.insert(value)?;
        }
        Ok(())
    }

    /// Number of times `value` was inserted, `0` if it was never seen.
    pub fn frequency_of(&self, value: f64) -> u64 {
        self.lock().frequency_of(value)
    }

    /// Number of distinct values.
    pub fn unique_count(&self) -> usize {
        self.lock().values.len()
    }

    /// Number of inserted values, duplicates included.
    pub fn total_count(&self) -> u64 {
        self.lock().total_count()
    }

    /// Checks whether no value was inserted yet.
    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    /// Get `index`-th smallest distinct value.
    pub fn value_at(&self, index: usize) -> Result<f64, StatsError> {
        self.lock().value_at(index)
    }

    /// Copy of all distinct values in ascending order.
    pub fn sorted_unique_values(&self) -> Vec<f64> {
        self.lock().values.iter().map(|v| v.into_inner()).collect()
    }

    /// Copy of all `(value, frequency)` pairs in ascending value order.
    pub fn entries(&self) -> Vec<(f64, u64)> {
        let inner = self.lock();
        inner
            .values
            .iter()
            .map(|v| v.into_inner())
            .zip(inner.frequencies.iter().copied())
            .collect()
    }

    /// Sum of all observations. `0` for an empty dataset.
    pub fn sum(&self) -> f64 {
        self.lock().sum()
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> Result<f64, StatsError> {
        self.lock().mean()
    }

    /// Index of the distinct value that holds the 1-based `rank` in the sorted sequence of all
    /// observations.
    ///
    /// Rank `0` maps to the first bucket. Ranks above [`total_count`](Self::total_count) fail with
    /// [`StatsError::RankOutOfRange`].
    pub fn rank_to_bucket(&self, rank: u64) -> Result<usize, StatsError> {
        self.lock().rank_to_bucket(rank)
    }

    /// Median. For an even number of observations the mean of the two middle values.
    pub fn median(&self) -> Result<f64, StatsError> {
        self.lock().median()
    }

    /// `p`-th percentile, `p` in `[0, 100]`.
    ///
    /// Fractional ranks average two adjacent distinct values instead of interpolating, see the
    /// type level documentation.
    pub fn percentile(&self, p: f64) -> Result<f64, StatsError> {
        self.lock().percentile(p)
    }

    /// Smallest observation.
    pub fn min(&self) -> Result<f64, StatsError> {
        self.percentile(0.)
    }

    /// Largest observation.
    pub fn max(&self) -> Result<f64, StatsError> {
        self.percentile(100.)
    }

    /// Population variance (divides by `n`, not `n - 1`).
    pub fn variance(&self) -> Result<f64, StatsError> {
        self.lock().variance()
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> Result<f64, StatsError> {
        self.variance().map(f64::sqrt)
    }

    /// Most frequent value. Ties are won by the smaller value.
    pub fn mode(&self) -> Result<f64, StatsError> {
        self.lock().mode()
    }

    /// Number of observations strictly greater than `threshold`.
    pub fn count_greater_than(&self, threshold: f64) -> u64 {
        self.lock().count_where(|v| v > threshold)
    }

    /// Number of observations strictly less than `threshold`.
    pub fn count_less_than(&self, threshold: f64) -> u64 {
        self.lock().count_where(|v| v < threshold)
    }

    /// Every statistic of a [`Summary`], taken under a single lock so that concurrent inserts
    /// cannot land between two of them.
    pub fn summary(&self) -> Result<Summary, StatsError> {
        let mut inner = self.lock();
        let mode = inner.mode()?;
        Ok(Summary {
            count: inner.total_count(),
            mean: inner.mean()?,
            median: inner.median()?,
            std_dev: inner.variance()?.sqrt(),
            min: inner.percentile(0.)?,
            max: inner.percentile(100.)?,
            p99_99: inner.percentile(99.99)?,
            p99: inner.percentile(99.)?,
            p95: inner.percentile(95.)?,
            p75: inner.percentile(75.)?,
            p25: inner.percentile(25.)?,
            p5: inner.percentile(5.)?,
            p1: inner.percentile(1.)?,
            p0_01: inner.percentile(0.01)?,
            mode,
            mode_frequency: inner.frequency_of(mode),
            above_mode: inner.count_where(|v| v > mode),
            below_mode: inner.count_where(|v| v < mode),
        })
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut inner = self.lock();
        let unique = inner.values.len();
        let total = inner.total_count();
        write!(f, "Dataset {{ unique: {}, total: {} }}", unique, total)
    }
}

impl Extend<f64> for Dataset {
    /// Non-finite values are skipped.
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        for value in iter {
            if let Err(err) = inner.insert(value) {
                warn!("skipping value: {}", err);
            }
        }
    }
}
