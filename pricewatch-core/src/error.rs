//! Structured error types for the price history engine.
//!
//! "No data" is never an error here: missing prices, empty stores and stale
//! lookups are all carried in return values. These variants only cover input
//! that violates a construction invariant.

use crate::domain::StoreId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid currency rate for store '{store}': {rate} (must be finite and > 0)")]
    InvalidRate { store: StoreId, rate: f64 },

    #[error("invalid raw price for store '{store}' at position {position}: {price}")]
    InvalidPrice {
        store: StoreId,
        position: usize,
        price: f64,
    },

    #[error(
        "samples for store '{store}' are not strictly ascending at position {position}"
    )]
    UnsortedSamples { store: StoreId, position: usize },

    #[error("store '{store}' appears more than once in the batch")]
    DuplicateStore { store: StoreId },

    #[error("invalid reporting period: {0}")]
    InvalidPeriod(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("batch error: {0}")]
    Batch(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
