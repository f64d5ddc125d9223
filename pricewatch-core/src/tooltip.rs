//! Tooltip composition: "what did every store show near time T".
//!
//! Composition runs in two phases:
//!
//! 1. Anchor selection: each store's index is queried at the pointer time
//!    and the anchor is the newest of the returned sample timestamps, i.e.
//!    the freshest price any store knew at that moment.
//! 2. Entry matching: each store's sample nearest to the anchor (on either
//!    side) is used if it lies within that store's staleness tolerance.
//!    Otherwise the store is reported as having no data.
//!
//! The phases must stay separate. Matching every store against the pointer
//! time directly would anchor on whichever store happens to be stale and
//! changes tie-breaks between stores with different cadences.

use crate::currency::Price;
use crate::domain::StoreId;
use crate::error::{EngineError, Result};
use crate::index::NearestPointIndex;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// How far a store's sample may lie from the anchor and still count.
///
/// Normally the store's expected check interval. Tolerances are never
/// negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staleness {
    default: Duration,
    overrides: HashMap<StoreId, Duration>,
}

impl Staleness {
    pub fn new(default: Duration) -> Result<Self> {
        Ok(Self {
            default: checked_tolerance(None, default)?,
            overrides: HashMap::new(),
        })
    }

    pub fn with_override(mut self, store: StoreId, tolerance: Duration) -> Result<Self> {
        self.set_override(store, tolerance)?;
        Ok(self)
    }

    pub fn set_override(&mut self, store: StoreId, tolerance: Duration) -> Result<()> {
        let tolerance = checked_tolerance(Some(&store), tolerance)?;
        self.overrides.insert(store, tolerance);
        Ok(())
    }

    pub fn tolerance_for(&self, store: &StoreId) -> Duration {
        self.overrides.get(store).copied().unwrap_or(self.default)
    }
}

fn checked_tolerance(store: Option<&StoreId>, tolerance: Duration) -> Result<Duration> {
    if tolerance < Duration::zero() {
        let scope = store.map_or_else(|| "default".to_string(), |s| format!("store '{s}'"));
        return Err(EngineError::Config(format!(
            "staleness tolerance for {scope} must not be negative, got {}s",
            tolerance.num_seconds()
        )));
    }
    Ok(tolerance)
}

/// One store's line in the tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipEntry {
    pub store_id: StoreId,
    /// Price in the canonical currency. `None` either because the store has
    /// no data near the anchor, or because its matched sample had no price.
    pub converted_price: Option<Price>,
    pub has_data: bool,
    /// Timestamp of the matched sample, when there is one.
    pub sample_timestamp: Option<DateTime<Utc>>,
}

impl TooltipEntry {
    fn no_data(store_id: StoreId) -> Self {
        Self {
            store_id,
            converted_price: None,
            has_data: false,
            sample_timestamp: None,
        }
    }

    /// Data near the anchor, with a price.
    pub fn is_priced(&self) -> bool {
        self.has_data && self.converted_price.is_some()
    }
}

/// The answer to a pointer query. `anchor` is `None` when no store had any
/// sample at or before the query time; `entries` is then empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TooltipSnapshot {
    pub anchor: Option<DateTime<Utc>>,
    pub entries: Vec<TooltipEntry>,
}

/// An entry in display order, with its distance from the cheapest price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub entry: TooltipEntry,
    /// `Some(0)` for the cheapest store, `Some(d)` with `d >= 0` for other
    /// priced stores, `None` for stores without a usable price.
    pub delta_from_cheapest: Option<Price>,
}

impl RankedEntry {
    pub fn is_cheapest(&self) -> bool {
        self.delta_from_cheapest == Some(0)
    }
}

impl TooltipSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when there was no data near the cursor at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, store: &StoreId) -> Option<&TooltipEntry> {
        self.entries.iter().find(|e| &e.store_id == store)
    }

    /// Lowest price among stores that have data near the anchor.
    pub fn cheapest(&self) -> Option<&TooltipEntry> {
        self.entries
            .iter()
            .filter(|e| e.is_priced())
            .min_by_key(|e| e.converted_price)
    }

    /// Entries in display order.
    ///
    /// Priced entries come first by ascending price, then stores with data
    /// but no price, then stores without data. Ties keep store order.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        let reference = self.cheapest().and_then(|e| e.converted_price);

        let mut ranked: Vec<RankedEntry> = self
            .entries
            .iter()
            .map(|entry| {
                let delta_from_cheapest = if entry.is_priced() {
                    entry
                        .converted_price
                        .zip(reference)
                        .map(|(price, cheapest)| price - cheapest)
                } else {
                    None
                };
                RankedEntry {
                    entry: entry.clone(),
                    delta_from_cheapest,
                }
            })
            .collect();

        ranked.sort_by_key(|r| rank_key(&r.entry));
        ranked
    }
}

fn rank_key(entry: &TooltipEntry) -> (u8, Price) {
    match (entry.has_data, entry.converted_price) {
        (true, Some(price)) => (0, price),
        (true, None) => (1, 0),
        (false, _) => (2, 0),
    }
}

/// Build the tooltip snapshot for a pointer at `query_time`.
///
/// Runs in O(stores × log samples) and can be called on every pointer move.
pub fn compose(
    indexes: &BTreeMap<StoreId, NearestPointIndex>,
    staleness: &Staleness,
    query_time: DateTime<Utc>,
) -> TooltipSnapshot {
    let anchor = indexes
        .values()
        .filter_map(|index| index.query(query_time))
        .map(|sample| sample.timestamp)
        .max();

    let Some(anchor) = anchor else {
        trace!(%query_time, "no store has data at or before query time");
        return TooltipSnapshot::empty();
    };

    let entries = indexes
        .iter()
        .map(|(store_id, index)| {
            let tolerance = staleness.tolerance_for(store_id);
            match index.nearest_within(anchor, tolerance) {
                Some(sample) => TooltipEntry {
                    store_id: store_id.clone(),
                    converted_price: index.convert(sample),
                    has_data: true,
                    sample_timestamp: Some(sample.timestamp),
                },
                None => TooltipEntry::no_data(store_id.clone()),
            }
        })
        .collect::<Vec<_>>();

    trace!(
        %query_time,
        %anchor,
        stores = entries.len(),
        with_data = entries.iter().filter(|e| e.has_data).count(),
        "composed tooltip"
    );

    TooltipSnapshot {
        anchor: Some(anchor),
        entries,
    }
}
