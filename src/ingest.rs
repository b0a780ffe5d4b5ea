//! Line oriented ingestion of numbers into a [`Dataset`].
//!
//! Every line holds one number. Grouping commas (`1,234.5`) and surrounding whitespace are
//! ignored, blank lines are skipped.
use std::io::{self, BufRead};
use std::num::ParseFloatError;

use log::debug;
use thiserror::Error;

use crate::dataset::Dataset;
use crate::error::StatsError;

/// Errors that abort loading.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading from the underlying reader failed.
    #[error("cannot read input")]
    Io(#[from] io::Error),

    /// A line is not a number.
    #[error("line {line}: cannot parse {text:?} as a number")]
    Parse {
        /// 1-based line number.
        line: u64,
        /// Line content after stripping commas and whitespace.
        text: String,
        /// Underlying parser error.
        #[source]
        source: ParseFloatError,
    },

    /// A parsed number was refused by the dataset.
    #[error("line {line}: {source}")]
    Rejected {
        /// 1-based line number.
        line: u64,
        /// Reason the dataset gave.
        #[source]
        source: StatsError,
    },
}

/// Parse a single input line.
///
/// Returns `Ok(None)` for blank lines. `inf` and `NaN` parse fine here; the dataset rejects them
/// on insertion.
pub fn parse_line(line: &str) -> Result<Option<f64>, ParseFloatError> {
    let cleaned = line.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }
    cleaned.parse().map(Some)
}

/// Feed every number from `reader` into `dataset`.
///
/// Stops at the first line that cannot be read, parsed or inserted. Values from earlier lines
/// stay in the dataset. Returns the number of inserted values.
pub fn load<R>(reader: R, dataset: &Dataset) -> Result<u64, IngestError>
where
    R: BufRead,
{
    let mut inserted = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx as u64 + 1;

        let value = match parse_line(&line) {
            Ok(Some(value)) => value,
            Ok(None) => continue,
            Err(source) => {
                return Err(IngestError::Parse {
                    line: lineno,
                    text: line.replace(',', "").trim().to_owned(),
                    source,
                });
            }
        };
        dataset
            .insert(value)
            .map_err(|source| IngestError::Rejected {
                line: lineno,
                source,
            })?;
        inserted += 1;
    }

    debug!(
        "loaded {} values ({} unique)",
        inserted,
        dataset.unique_count()
    );
    Ok(inserted)
}
