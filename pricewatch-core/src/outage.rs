//! Shared stock-outage detection.
//!
//! Stores sample independently, so two stores almost never report at the
//! same instant. Samples are therefore grouped into fixed-width buckets
//! (one hour by default) and a bucket counts as stocked out when it holds at
//! least one sample and none of its samples reports stock. This is a lossy
//! simplification: an exact-instant comparison would miss most shared
//! outages.
//!
//! Buckets without any sample are never stocked out. A store that did not
//! report is not evidence of an outage.

use crate::domain::StoreSeries;
use crate::error::{EngineError, Result};
use crate::timeline::MergedTimeline;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive range of timeline positions during which every reporting store
/// was out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfStockInterval {
    pub start_index: usize,
    pub end_index: usize,
}

impl OutOfStockInterval {
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.end_index).contains(&index)
    }

    /// First and last instant covered, looked up on the timeline the
    /// interval was detected on.
    pub fn span(&self, timeline: &MergedTimeline) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((timeline.get(self.start_index)?, timeline.get(self.end_index)?))
    }
}

/// What the samples of one bucket say about availability.
#[derive(Debug, Clone, Copy, Default)]
struct BucketEvidence {
    any_in_stock: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct OutOfStockDetector {
    bucket_secs: i64,
}

impl Default for OutOfStockDetector {
    fn default() -> Self {
        Self::hourly()
    }
}

impl OutOfStockDetector {
    /// Hour buckets.
    pub fn hourly() -> Self {
        Self { bucket_secs: 3600 }
    }

    /// Custom bucket width; must be at least one second.
    pub fn with_bucket(width: Duration) -> Result<Self> {
        let bucket_secs = width.num_seconds();
        if bucket_secs <= 0 {
            return Err(EngineError::Config(format!(
                "outage bucket must be at least one second, got {bucket_secs}s"
            )));
        }
        Ok(Self { bucket_secs })
    }

    fn bucket_of(&self, t: DateTime<Utc>) -> i64 {
        t.timestamp().div_euclid(self.bucket_secs)
    }

    /// Maximal runs of timeline positions whose bucket is stocked out.
    ///
    /// Intervals come back ascending, never overlapping and never adjacent.
    pub fn detect(
        &self,
        series: &[StoreSeries],
        timeline: &MergedTimeline,
    ) -> Vec<OutOfStockInterval> {
        let mut buckets: HashMap<i64, BucketEvidence> = HashMap::new();
        for store in series {
            for sample in store.samples() {
                let evidence = buckets.entry(self.bucket_of(sample.timestamp)).or_default();
                evidence.any_in_stock |= sample.in_stock();
            }
        }

        let mut intervals = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i, instant) in timeline.instants().iter().enumerate() {
            let stocked_out = buckets
                .get(&self.bucket_of(*instant))
                .is_some_and(|e| !e.any_in_stock);

            match (stocked_out, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    intervals.push(OutOfStockInterval {
                        start_index: start,
                        end_index: i - 1,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }

        // A run reaching the end of the timeline closes at the last position.
        if let Some(start) = run_start {
            intervals.push(OutOfStockInterval {
                start_index: start,
                end_index: timeline.len() - 1,
            });
        }

        intervals
    }
}

/// Detect outages with hour buckets.
pub fn detect(series: &[StoreSeries], timeline: &MergedTimeline) -> Vec<OutOfStockInterval> {
    OutOfStockDetector::hourly().detect(series, timeline)
}
