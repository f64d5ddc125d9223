//! Currency normalization.
//!
//! Every store quotes in its own currency. Prices are converted once, at
//! series construction or lookup time, into the canonical currency so that
//! stores can be compared and ranked against each other.

use serde::{Deserialize, Serialize};

/// Price in the canonical currency, rounded to whole units.
pub type Price = i64;

/// Multiplier from a store's native currency to the canonical one.
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct CurrencyRate(f64);

impl CurrencyRate {
    /// Rate of a store that already quotes in the canonical currency.
    pub const IDENTITY: CurrencyRate = CurrencyRate(1.0);

    /// Returns `None` for zero, negative, NaN or infinite rates.
    pub fn new(rate: f64) -> Option<Self> {
        (rate.is_finite() && rate > 0.0).then_some(Self(rate))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_identity(self) -> bool {
        self.0 == 1.0
    }

    /// True if `raw` converts to a representable [`Price`].
    pub fn can_convert(self, raw: f64) -> bool {
        (raw * self.0).round().abs() < PRICE_LIMIT
    }
}

/// 2^63: the first magnitude an `i64` cannot hold.
const PRICE_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl Default for CurrencyRate {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TryFrom<f64> for CurrencyRate {
    type Error = String;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate).ok_or_else(|| format!("currency rate must be finite and > 0, got {rate}"))
    }
}

impl From<CurrencyRate> for f64 {
    fn from(rate: CurrencyRate) -> f64 {
        rate.0
    }
}

/// Convert a native price into the canonical currency.
///
/// A missing price stays missing: no price is not a pricing event and must
/// never turn into zero. Prices outside [`CurrencyRate::can_convert`]
/// saturate; validated series never contain them.
pub fn convert(raw_price: Option<f64>, rate: CurrencyRate) -> Option<Price> {
    raw_price.map(|p| (p * rate.0).round() as Price)
}
