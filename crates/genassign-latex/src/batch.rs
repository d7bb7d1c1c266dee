//! Running the driver over a whole worksheet

use std::time::{Duration, Instant};

use genassign_core::Record;
use tracing::{error, info, warn};

use crate::driver::{Driver, RecordFailure, RecordOutput};
use crate::error::JobError;
use crate::toolchain::Toolchain;

/// Outcome of a complete run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<(Record, RecordOutput)>,
    pub failed: Vec<(Record, RecordFailure)>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Records attempted
    pub fn processed(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Process `records` in order
///
/// `report` sees every record's outcome as soon as it is known. Per-record
/// failures are collected and the run moves on; a fatal failure stops the
/// run and is returned.
pub fn run_batch<T, F>(
    driver: &Driver<'_, T>,
    records: &[Record],
    mut report: F,
) -> Result<RunSummary, JobError>
where
    T: Toolchain,
    F: FnMut(&Record, &Result<RecordOutput, RecordFailure>),
{
    let start = Instant::now();
    let mut summary = RunSummary::default();

    for record in records {
        info!(record = record.index, label = %record.label(), "Processing record");
        let outcome = driver.process(record);
        report(record, &outcome);

        match outcome {
            Ok(output) => summary.completed.push((record.clone(), output)),
            Err(failure) if failure.error.is_fatal() => {
                error!(record = record.index, error = %failure.error, "Aborting run");
                return Err(failure.error);
            }
            Err(failure) => {
                warn!(record = record.index, error = %failure, "Record failed");
                summary.failed.push((record.clone(), failure));
            }
        }
    }

    summary.elapsed = start.elapsed();
    info!(
        processed = summary.processed(),
        failed = summary.failed.len(),
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "Run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::default();
        assert_eq!(summary.processed(), 0);
        assert!(summary.is_success());
    }
}
