//! Multi-store time alignment.
//!
//! Every store samples on its own schedule. The merged timeline is the union
//! of all sample instants plus `now`, and serves as the shared x-axis. Prices
//! aligned onto it are strict: a store without a sample at an instant gets a
//! gap, never a carried-forward value.

use crate::currency::Price;
use crate::domain::StoreSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

/// Deduplicated, ascending instants across all stores, ending with `now`
/// unless some sample is newer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedTimeline {
    instants: Vec<DateTime<Utc>>,
}

impl MergedTimeline {
    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.instants
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<DateTime<Utc>> {
        self.instants.get(index).copied()
    }

    /// Index of an exact instant on the timeline.
    pub fn position(&self, instant: DateTime<Utc>) -> Option<usize> {
        self.instants.binary_search(&instant).ok()
    }
}

/// Merge all stores' sample instants with `now` into one timeline.
///
/// `now` is sampled once by the caller and shared by every store in the pass.
/// The result depends only on the set of instants, not on the order of
/// `series`.
pub fn merge(series: &[StoreSeries], now: DateTime<Utc>) -> MergedTimeline {
    let mut all_instants = BTreeSet::new();
    for store in series {
        for sample in store.samples() {
            all_instants.insert(sample.timestamp);
        }
    }
    all_instants.insert(now);

    MergedTimeline {
        instants: all_instants.into_iter().collect(),
    }
}

/// Converted prices of one store, one slot per timeline instant.
///
/// A slot is `None` when the store has no sample at exactly that instant, or
/// when its sample there carries no price.
pub fn align_prices(series: &StoreSeries, timeline: &MergedTimeline) -> Vec<Option<Price>> {
    let samples = series.samples();
    let mut aligned = Vec::with_capacity(timeline.len());
    let mut cursor = 0;

    // Both sides are ascending, so a single forward walk suffices.
    for instant in timeline.instants() {
        while cursor < samples.len() && samples[cursor].timestamp < *instant {
            cursor += 1;
        }
        let price = samples
            .get(cursor)
            .filter(|s| s.timestamp == *instant)
            .and_then(|s| series.convert(s));
        aligned.push(price);
    }

    aligned
}
