//! Property tests for `Dataset`, checked against a plain sorted vector.
use std::collections::HashMap;

use freqstats::{Dataset, StatsError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(f64),
    Percentile(f64),
    Frequency(f64),
    Rank(u64),
    Threshold(f64),
}

/// Quarter steps from a narrow range, so that duplicates are common.
fn value() -> impl Strategy<Value = f64> {
    (-40i32..40).prop_map(|x| f64::from(x) / 4.)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => value().prop_map(Op::Insert),
        1 => (0u32..=10_000).prop_map(|p| Op::Percentile(f64::from(p) / 100.)),
        1 => value().prop_map(Op::Frequency),
        1 => (0u64..64).prop_map(Op::Rank),
        1 => value().prop_map(Op::Threshold),
    ]
}

/// Every observable result of one query, for comparing two datasets.
fn observe(dataset: &Dataset, op: &Op) -> Vec<Result<f64, StatsError>> {
    let mut out = vec![
        Ok(dataset.total_count() as f64),
        Ok(dataset.unique_count() as f64),
        Ok(dataset.sum()),
        dataset.mean(),
        dataset.median(),
        dataset.variance(),
        dataset.mode(),
    ];
    match op {
        Op::Insert(_) => {}
        Op::Percentile(p) => out.push(dataset.percentile(*p)),
        Op::Frequency(v) => out.push(Ok(dataset.frequency_of(*v) as f64)),
        Op::Rank(r) => out.push(dataset.rank_to_bucket(*r).map(|idx| idx as f64)),
        Op::Threshold(t) => {
            out.push(Ok(dataset.count_greater_than(*t) as f64));
            out.push(Ok(dataset.count_less_than(*t) as f64));
        }
    }
    out
}

proptest! {
    #[test]
    fn sorted_and_aligned(values in prop::collection::vec(value(), 0..200)) {
        let dataset = Dataset::from_values(values.iter().copied()).unwrap();

        let unique = dataset.sorted_unique_values();
        prop_assert!(unique.windows(2).all(|w| w[0] < w[1]));

        let entries = dataset.entries();
        prop_assert_eq!(entries.len(), unique.len());
        prop_assert!(entries.iter().all(|(_v, f)| *f >= 1));
        prop_assert_eq!(entries.iter().map(|(_v, f)| *f).sum::<u64>(), values.len() as u64);
        prop_assert_eq!(dataset.total_count(), values.len() as u64);
    }

    #[test]
    fn frequencies_match_counts(values in prop::collection::vec(value(), 0..200)) {
        let dataset = Dataset::from_values(values.iter().copied()).unwrap();

        let mut expected: HashMap<i64, u64> = HashMap::new();
        for v in &values {
            *expected.entry((v * 4.) as i64).or_default() += 1;
        }
        for (key, count) in expected {
            prop_assert_eq!(dataset.frequency_of(key as f64 / 4.), count);
        }
        prop_assert_eq!(dataset.frequency_of(1000.), 0);
    }

    #[test]
    fn order_statistics_match_sorted_vec(values in prop::collection::vec(value(), 1..200)) {
        let dataset = Dataset::from_values(values.iter().copied()).unwrap();
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = sorted.len();

        prop_assert_eq!(dataset.min(), Ok(sorted[0]));
        prop_assert_eq!(dataset.max(), Ok(sorted[n - 1]));

        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.
        };
        prop_assert_eq!(dataset.median(), Ok(median));

        for rank in 1..=n {
            let bucket = dataset.rank_to_bucket(rank as u64).unwrap();
            prop_assert_eq!(dataset.value_at(bucket), Ok(sorted[rank - 1]));
        }
        prop_assert_eq!(
            dataset.rank_to_bucket(n as u64 + 1),
            Err(StatsError::RankOutOfRange { rank: n as u64 + 1, total: n as u64 })
        );
    }

    #[test]
    fn threshold_counts_match_filter(
        values in prop::collection::vec(value(), 0..200),
        threshold in value(),
    ) {
        let dataset = Dataset::from_values(values.iter().copied()).unwrap();
        let greater = values.iter().filter(|v| **v > threshold).count() as u64;
        let less = values.iter().filter(|v| **v < threshold).count() as u64;
        prop_assert_eq!(dataset.count_greater_than(threshold), greater);
        prop_assert_eq!(dataset.count_less_than(threshold), less);
    }

    #[test]
    fn percentile_within_bounds(
        values in prop::collection::vec(value(), 1..200),
        p in 0f64..=100.,
    ) {
        let dataset = Dataset::from_values(values.iter().copied()).unwrap();
        let x = dataset.percentile(p).unwrap();
        prop_assert!(x >= dataset.min().unwrap());
        prop_assert!(x <= dataset.max().unwrap());
    }

    #[test]
    fn cache_is_transparent(ops in prop::collection::vec(op(), 0..150)) {
        let cached = Dataset::new();
        let uncached = Dataset::without_cache();

        for op in &ops {
            if let Op::Insert(v) = op {
                cached.insert(*v).unwrap();
                uncached.insert(*v).unwrap();
            }
            let first = observe(&cached, op);
            prop_assert_eq!(&first, &observe(&uncached, op));
            // served from the cache this time
            prop_assert_eq!(&first, &observe(&cached, op));
        }
    }
}
