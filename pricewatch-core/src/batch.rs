//! Wire types for an already-fetched per-store history batch.
//!
//! The dashboard backend hands over one batch per tracked store for the
//! selected period. Two encodings are accepted:
//!
//! - JSON: an array of [`StoreBatch`] objects.
//! - CSV: one row per sample, `store_id,timestamp,price,stock`, with an empty
//!   `price` meaning "no price". Currency rates are supplied separately.

use crate::config::secs;
use crate::domain::{Sample, StoreId, StoreSeries};
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// One sample as delivered by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub price: Option<f64>,
    pub stock: u32,
}

/// A store's samples for the selected period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreBatch {
    pub store_id: StoreId,
    #[serde(default = "identity_rate")]
    pub currency_rate: f64,
    /// Overrides the shared check interval for this store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_secs: Option<u64>,
    #[serde(default)]
    pub samples: Vec<RawSample>,
}

fn identity_rate() -> f64 {
    1.0
}

impl StoreBatch {
    pub fn new(store_id: impl Into<StoreId>, currency_rate: f64, samples: Vec<RawSample>) -> Self {
        Self {
            store_id: store_id.into(),
            currency_rate,
            check_interval_secs: None,
            samples,
        }
    }

    /// Validate the batch into a series.
    pub fn into_series(self) -> Result<StoreSeries> {
        let samples = self
            .samples
            .into_iter()
            .map(|s| Sample::new(s.timestamp, s.price, s.stock))
            .collect();
        let series = StoreSeries::from_raw_rate(self.store_id, self.currency_rate, samples)?;
        Ok(match self.check_interval_secs {
            Some(interval) => series.with_check_interval(secs(interval)),
            None => series,
        })
    }
}

/// Parse a JSON array of store batches.
pub fn from_json_str(content: &str) -> Result<Vec<StoreBatch>> {
    serde_json::from_str(content).map_err(|e| EngineError::Batch(format!("parse JSON: {e}")))
}

pub fn from_json_reader(reader: impl Read) -> Result<Vec<StoreBatch>> {
    serde_json::from_reader(reader).map_err(|e| EngineError::Batch(format!("parse JSON: {e}")))
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    store_id: String,
    timestamp: DateTime<Utc>,
    price: Option<f64>,
    stock: u32,
}

/// Read samples from CSV, grouping rows by store.
///
/// Stores keep the order in which they first appear. Rows of one store are
/// sorted by timestamp; duplicate timestamps are left in place and rejected
/// later when the batch is turned into a series. Stores missing from `rates`
/// get the identity rate.
pub fn from_csv_reader(
    reader: impl Read,
    rates: &HashMap<StoreId, f64>,
) -> Result<Vec<StoreBatch>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut batches: Vec<StoreBatch> = Vec::new();
    let mut by_store: HashMap<StoreId, usize> = HashMap::new();

    for (line, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| EngineError::Batch(format!("CSV row {}: {e}", line + 1)))?;
        let store_id = StoreId::from(row.store_id);
        let slot = *by_store.entry(store_id.clone()).or_insert_with(|| {
            let rate = rates.get(&store_id).copied().unwrap_or(1.0);
            batches.push(StoreBatch::new(store_id.clone(), rate, Vec::new()));
            batches.len() - 1
        });
        batches[slot].samples.push(RawSample {
            timestamp: row.timestamp,
            price: row.price,
            stock: row.stock,
        });
    }

    for batch in &mut batches {
        batch.samples.sort_by_key(|s| s.timestamp);
    }

    Ok(batches)
}
