//! StoreSeries — one store's validated observation history for a period.

use super::{Sample, StoreId};
use crate::currency::{self, CurrencyRate, Price};
use crate::error::{EngineError, Result};
use crate::period::ReportingPeriod;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Ordered samples of a single store, plus what is needed to compare them
/// with other stores.
///
/// Samples are strictly ascending by timestamp. The sample slice is shared
/// (`Arc`) so indexes can hold onto it without copying.
#[derive(Debug, Clone)]
pub struct StoreSeries {
    store_id: StoreId,
    rate: CurrencyRate,
    samples: Arc<[Sample]>,
    check_interval: Option<Duration>,
}

impl StoreSeries {
    /// Validate and wrap a store's samples.
    ///
    /// Rejects samples that are not strictly ascending, prices that are
    /// negative or non-finite, and prices too large to convert at `rate`.
    /// An empty sample list is accepted.
    pub fn new(store_id: StoreId, rate: CurrencyRate, samples: Vec<Sample>) -> Result<Self> {
        for (position, sample) in samples.iter().enumerate() {
            let convertible = sample.raw_price.map_or(true, |p| rate.can_convert(p));
            if !sample.has_valid_price() || !convertible {
                return Err(EngineError::InvalidPrice {
                    store: store_id,
                    position,
                    price: sample.raw_price.unwrap_or(f64::NAN),
                });
            }
        }
        if let Some(position) = first_unsorted(&samples) {
            return Err(EngineError::UnsortedSamples {
                store: store_id,
                position,
            });
        }

        Ok(Self {
            store_id,
            rate,
            samples: samples.into(),
            check_interval: None,
        })
    }

    /// Same as [`StoreSeries::new`] but takes the rate as a plain number.
    pub fn from_raw_rate(store_id: StoreId, rate: f64, samples: Vec<Sample>) -> Result<Self> {
        let rate = CurrencyRate::new(rate).ok_or_else(|| EngineError::InvalidRate {
            store: store_id.clone(),
            rate,
        })?;
        Self::new(store_id, rate, samples)
    }

    /// Override the shared check interval for this store.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    pub fn store_id(&self) -> &StoreId {
        &self.store_id
    }

    pub fn rate(&self) -> CurrencyRate {
        self.rate
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub(crate) fn shared_samples(&self) -> Arc<[Sample]> {
        Arc::clone(&self.samples)
    }

    pub fn check_interval(&self) -> Option<Duration> {
        self.check_interval
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Converted price of a sample of this store.
    pub fn convert(&self, sample: &Sample) -> Option<Price> {
        currency::convert(sample.raw_price, self.rate)
    }

    /// True if at least one sample carries a price.
    pub fn has_any_price(&self) -> bool {
        self.samples.iter().any(|s| s.raw_price.is_some())
    }

    /// Keep only the samples inside the reporting period ending at `now`.
    pub fn within(&self, period: ReportingPeriod, now: DateTime<Utc>) -> Self {
        let Some(cutoff) = period.cutoff(now) else {
            return self.clone();
        };
        let start = self.samples.partition_point(|s| s.timestamp < cutoff);
        if start == 0 {
            return self.clone();
        }
        Self {
            store_id: self.store_id.clone(),
            rate: self.rate,
            samples: Arc::from(&self.samples[start..]),
            check_interval: self.check_interval,
        }
    }
}

/// Position of the first sample that does not strictly follow its predecessor.
fn first_unsorted(samples: &[Sample]) -> Option<usize> {
    samples
        .windows(2)
        .position(|w| w[0].timestamp >= w[1].timestamp)
        .map(|i| i + 1)
}
