//! Engine configuration.
//!
//! Stored as TOML:
//!
//! ```toml
//! check_interval_secs = 3600
//! period = "90d"
//! outage_bucket_secs = 3600
//!
//! [store_overrides.slow-shop]
//! check_interval_secs = 21600
//! ```

use crate::domain::StoreId;
use crate::error::{EngineError, Result};
use crate::outage::OutOfStockDetector;
use crate::period::ReportingPeriod;
use crate::tooltip::Staleness;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_OUTAGE_BUCKET_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Expected time between two checks of a store; also the staleness
    /// tolerance for tooltip matching.
    pub check_interval_secs: u64,
    pub period: ReportingPeriod,
    pub outage_bucket_secs: u64,
    pub store_overrides: BTreeMap<StoreId, StoreOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOverride {
    pub check_interval_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            period: ReportingPeriod::All,
            outage_bucket_secs: DEFAULT_OUTAGE_BUCKET_SECS,
            store_overrides: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EngineError::Config(format!("parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(format!("write TOML: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.outage_bucket_secs == 0 {
            return Err(EngineError::Config("outage_bucket_secs must be > 0".into()));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        secs(self.check_interval_secs)
    }

    /// Tolerances for tooltip matching.
    ///
    /// Starts from the shared interval, applies the per-store intervals that
    /// came with the batch, then this config's `store_overrides`, so the
    /// config has the last word.
    pub fn staleness_with<I>(&self, batch_intervals: I) -> Result<Staleness>
    where
        I: IntoIterator<Item = (StoreId, Duration)>,
    {
        let mut staleness = Staleness::new(self.check_interval())?;
        for (store, interval) in batch_intervals {
            staleness.set_override(store, interval)?;
        }
        for (store, over) in &self.store_overrides {
            if let Some(interval) = over.check_interval_secs {
                staleness.set_override(store.clone(), secs(interval))?;
            }
        }
        Ok(staleness)
    }

    pub fn outage_detector(&self) -> Result<OutOfStockDetector> {
        OutOfStockDetector::with_bucket(secs(self.outage_bucket_secs))
    }
}

/// Seconds to a duration, saturating at the largest representable span.
pub(crate) fn secs(value: u64) -> Duration {
    Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX).min(i64::MAX / 1000))
}
