//! Error conditions signalled by [`Dataset`](crate::dataset::Dataset).
use thiserror::Error;

/// Reasons a dataset operation can fail.
///
/// A value that was never inserted is not an error: frequency lookups simply report `0` for it.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum StatsError {
    /// The statistic is undefined because no value was inserted yet.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Percentiles must lie within `[0, 100]`.
    #[error("percentile ({0}) must be within [0, 100]")]
    PercentileOutOfRange(f64),

    /// A global rank beyond the number of observations was requested.
    #[error("rank {rank} exceeds total count {total}")]
    RankOutOfRange {
        /// Requested 1-based rank.
        rank: u64,
        /// Number of observations in the dataset.
        total: u64,
    },

    /// An index into the unique values was out of bounds.
    #[error("index {index} out of bounds for {len} unique values")]
    IndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of unique values.
        len: usize,
    },

    /// NaN and infinities cannot be ordered and are rejected on insertion.
    #[error("non-finite value ({0}) cannot be inserted")]
    NonFinite(f64),
}
