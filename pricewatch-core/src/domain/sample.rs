//! Sample — one observation of a store at an instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single price/stock observation.
///
/// `raw_price` is in the store's native currency. `None` means the store
/// listed no price (usually because nothing was in stock); it is not zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub raw_price: Option<f64>,
    pub stock: u32,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, raw_price: Option<f64>, stock: u32) -> Self {
        Self {
            timestamp,
            raw_price,
            stock,
        }
    }

    /// True if the store reported at least one unit available.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// True if the price is absent or a usable non-negative number.
    pub fn has_valid_price(&self) -> bool {
        match self.raw_price {
            None => true,
            Some(p) => p.is_finite() && p >= 0.0,
        }
    }
}
