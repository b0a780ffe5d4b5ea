//! Summary table of the statistics `ds` prints.
use std::fmt;

use num_format::{Locale, ToFormattedString};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::StatsError;

/// Spaces between two columns.
const PADDING: usize = 8;

/// Fixed decimals before trailing zeros are cut.
const DECIMALS: usize = 5;

/// How [`Summary::render`] lays out the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// One `label: value` line per statistic.
    #[default]
    Vertical,
    /// A header line with all labels, followed by a line with all values.
    Horizontal,
}

/// Snapshot of the descriptive statistics of a dataset.
///
/// All fields are computed under one lock of the dataset, so they describe the same state even
/// while other threads insert.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Summary {
    /// Number of observations.
    pub count: u64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// 99.99th percentile.
    pub p99_99: f64,
    /// 99th percentile.
    pub p99: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 5th percentile.
    pub p5: f64,
    /// 1st percentile.
    pub p1: f64,
    /// 0.01th percentile.
    pub p0_01: f64,
    /// Most frequent value.
    pub mode: f64,
    /// Frequency of [`mode`](Self::mode).
    pub mode_frequency: u64,
    /// Observations greater than [`mode`](Self::mode).
    pub above_mode: u64,
    /// Observations less than [`mode`](Self::mode).
    pub below_mode: u64,
}

impl Summary {
    /// Compute all statistics. Fails with [`StatsError::EmptyDataset`] if nothing was inserted.
    ///
    /// Same as [`Dataset::summary`].
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, StatsError> {
        dataset.summary()
    }

    /// Labels and formatted values, in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("n", format_count(self.count)),
            ("mean", format_float(self.mean)),
            ("median", format_float(self.median)),
            ("std dev", format_float(self.std_dev)),
            ("min", format_float(self.min)),
            ("max", format_float(self.max)),
            ("P99.99", format_float(self.p99_99)),
            ("P99", format_float(self.p99)),
            ("P95", format_float(self.p95)),
            ("P75", format_float(self.p75)),
            ("P25", format_float(self.p25)),
            ("P5", format_float(self.p5)),
            ("P1", format_float(self.p1)),
            ("P0.01", format_float(self.p0_01)),
            ("Top Freq Num", format_float(self.mode)),
            ("Top Freq", format_count(self.mode_frequency)),
            ("> Top Freq", format_count(self.above_mode)),
            ("< Top Freq", format_count(self.below_mode)),
        ]
    }

    /// Render as an aligned text table.
    pub fn render(&self, layout: Layout) -> String {
        let rows = self.rows();
        let mut out = String::new();

        match layout {
            Layout::Vertical => {
                let labels: Vec<String> = rows.iter().map(|(l, _v)| format!("{}:", l)).collect();
                let width = labels.iter().map(|l| l.len()).max().unwrap_or(0) + PADDING;
                for (label, (_l, value)) in labels.iter().zip(&rows) {
                    out.push_str(&format!("{:<width$}{}\n", label, value, width = width));
                }
            }
            Layout::Horizontal => {
                let widths: Vec<usize> = rows
                    .iter()
                    .map(|(l, v)| l.len().max(v.len()) + PADDING)
                    .collect();
                for (l, width) in rows.iter().map(|(l, _v)| l).zip(&widths) {
                    out.push_str(&format!("{:<width$}", l, width = width));
                }
                out.push('\n');
                for (v, width) in rows.iter().map(|(_l, v)| v).zip(&widths) {
                    out.push_str(&format!("{:<width$}", v, width = width));
                }
                out.push('\n');
            }
        }

        out
    }

    /// Pretty printed JSON object with one field per statistic.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Layout::Vertical))
    }
}

/// Format a count with thousands separators.
pub fn format_count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Format a float with five decimals and thousands separators, dropping trailing zeros.
///
/// ```
/// use freqstats::summary::format_float;
///
/// assert_eq!(format_float(1234567.125), "1,234,567.125");
/// assert_eq!(format_float(2.0), "2");
/// assert_eq!(format_float(0.123456), "0.12346");
/// ```
pub fn format_float(x: f64) -> String {
    let fixed = format!("{:.*}", DECIMALS, x);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
