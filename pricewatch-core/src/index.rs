//! Per-store nearest-point lookup.
//!
//! The index shares the store's already-sorted sample slice, so building it
//! is O(1) and queries are a binary search.

use crate::currency::{CurrencyRate, Price};
use crate::domain::{Sample, StoreId, StoreSeries};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NearestPointIndex {
    store_id: StoreId,
    rate: CurrencyRate,
    samples: Arc<[Sample]>,
}

impl NearestPointIndex {
    /// Index a validated series. The series guarantees strict ordering, so
    /// this never fails.
    pub fn build(series: &StoreSeries) -> Self {
        Self {
            store_id: series.store_id().clone(),
            rate: series.rate(),
            samples: series.shared_samples(),
        }
    }

    /// Index raw samples, rejecting unsorted input.
    pub fn from_samples(
        store_id: StoreId,
        rate: CurrencyRate,
        samples: Vec<Sample>,
    ) -> Result<Self> {
        let series = StoreSeries::new(store_id, rate, samples)?;
        Ok(Self::build(&series))
    }

    pub fn store_id(&self) -> &StoreId {
        &self.store_id
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Latest sample at or before `t`. Never looks forward in time.
    pub fn query(&self, t: DateTime<Utc>) -> Option<&Sample> {
        let after = self.samples.partition_point(|s| s.timestamp <= t);
        after.checked_sub(1).map(|i| &self.samples[i])
    }

    /// Sample closest to `t` on either side. Equal distances resolve to the
    /// earlier sample.
    pub fn nearest(&self, t: DateTime<Utc>) -> Option<&Sample> {
        let after = self.samples.partition_point(|s| s.timestamp <= t);
        let before = after.checked_sub(1).map(|i| &self.samples[i]);
        let next = self.samples.get(after);

        match (before, next) {
            (Some(b), Some(n)) => {
                if n.timestamp - t < t - b.timestamp {
                    Some(n)
                } else {
                    Some(b)
                }
            }
            (Some(b), None) => Some(b),
            (None, n) => n,
        }
    }

    /// Nearest sample to `t` if it lies within `tolerance` of it.
    pub fn nearest_within(&self, t: DateTime<Utc>, tolerance: Duration) -> Option<&Sample> {
        self.nearest(t).filter(|s| (s.timestamp - t).abs() <= tolerance)
    }

    /// Converted price of a sample of this store.
    pub fn convert(&self, sample: &Sample) -> Option<Price> {
        crate::currency::convert(sample.raw_price, self.rate)
    }
}
