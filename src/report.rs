//! Per-file outcomes and the aggregate batch report.
//!
//! The driver owns a [`Tally`] while it runs; the caller only ever sees the
//! frozen [`BatchReport`] produced once the run is over.

use crate::batch::ResizeError;
use serde::Serialize;
use std::fmt;

/// Why a file was left as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The image did not exceed the trigger.
    BelowThreshold,
    /// The re-encode came out larger and `force` was off.
    NegativeSavings,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::BelowThreshold => "below threshold",
            SkipReason::NegativeSavings => "negative savings",
        })
    }
}

/// Result of running one file through the pipeline.
#[derive(Debug)]
pub enum ResizeOutcome {
    Resized { bytes_saved: i64 },
    Skipped(SkipReason),
    Failed(ResizeError),
}

/// Final counts for one batch run.
///
/// `processed == resized + skipped + failed` always holds. Files that were
/// never reached because of cancellation are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub resized: usize,
    pub skipped: usize,
    pub failed: usize,
    pub canceled: bool,
    /// Sum of savings over committed files (negative when forced resizes grew).
    pub bytes_saved: i64,
}

/// Running counters, private to one batch run.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    resized: usize,
    skipped: usize,
    failed: usize,
    bytes_saved: i64,
}

impl Tally {
    pub(crate) fn record(&mut self, outcome: &ResizeOutcome) {
        match outcome {
            ResizeOutcome::Resized { bytes_saved } => {
                self.resized += 1;
                self.bytes_saved += bytes_saved;
            }
            ResizeOutcome::Skipped(_) => self.skipped += 1,
            ResizeOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Consume the counters into the published report.
    pub(crate) fn freeze(self, canceled: bool) -> BatchReport {
        BatchReport {
            processed: self.resized + self.skipped + self.failed,
            resized: self.resized,
            skipped: self.skipped,
            failed: self.failed,
            canceled,
            bytes_saved: self.bytes_saved,
        }
    }
}
