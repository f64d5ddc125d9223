//! Chart model — everything the renderer needs for one item and period.
//!
//! A [`PriceChart`] is built in one pass from a fetched batch: series are
//! validated and trimmed to the period, the timeline is merged against a
//! single `now`, outages are detected and one index is built per store.
//! After that it is read-only. A period change or data refresh builds a new
//! chart and swaps it in through [`ChartSession::replace`]; nothing is
//! patched in place, so a query can never hit an index from an older period.

use crate::batch::StoreBatch;
use crate::config::EngineConfig;
use crate::currency::Price;
use crate::domain::{StoreId, StoreSeries};
use crate::error::{EngineError, Result};
use crate::index::NearestPointIndex;
use crate::outage::OutOfStockInterval;
use crate::period::ReportingPeriod;
use crate::timeline::{self, MergedTimeline};
use crate::tooltip::{self, RankedEntry, Staleness, TooltipSnapshot};
use crate::visibility::Visibility;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PriceChart {
    now: DateTime<Utc>,
    period: ReportingPeriod,
    series: Vec<StoreSeries>,
    timeline: MergedTimeline,
    price_lines: BTreeMap<StoreId, Vec<Option<Price>>>,
    outages: Vec<OutOfStockInterval>,
    indexes: BTreeMap<StoreId, NearestPointIndex>,
    staleness: Staleness,
}

impl PriceChart {
    /// Validate a fetched batch and build the chart for `config.period`.
    pub fn build(
        batches: Vec<StoreBatch>,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let series = batches
            .into_iter()
            .map(StoreBatch::into_series)
            .collect::<Result<Vec<_>>>()?;
        Self::from_series(series, config, now)
    }

    /// Build from already validated series.
    pub fn from_series(
        series: Vec<StoreSeries>,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;
        let detector = config.outage_detector()?;

        let mut seen = BTreeSet::new();
        for store in &series {
            if !seen.insert(store.store_id().clone()) {
                return Err(EngineError::DuplicateStore {
                    store: store.store_id().clone(),
                });
            }
        }

        let mut series: Vec<StoreSeries> = series
            .iter()
            .map(|s| s.within(config.period, now))
            .collect();
        series.sort_by(|a, b| a.store_id().cmp(b.store_id()));

        let staleness = config.staleness_with(
            series
                .iter()
                .filter_map(|s| Some((s.store_id().clone(), s.check_interval()?))),
        )?;

        for store in series.iter().filter(|s| s.is_empty()) {
            warn!(
                store = %store.store_id(),
                period = %config.period,
                "store has no samples in period"
            );
        }

        let timeline = timeline::merge(&series, now);
        let outages = detector.detect(&series, &timeline);
        let price_lines = series
            .iter()
            .map(|s| (s.store_id().clone(), timeline::align_prices(s, &timeline)))
            .collect();
        let indexes = series
            .iter()
            .map(|s| (s.store_id().clone(), NearestPointIndex::build(s)))
            .collect();

        debug!(
            stores = series.len(),
            samples = series.iter().map(StoreSeries::len).sum::<usize>(),
            timeline_len = timeline.len(),
            outages = outages.len(),
            period = %config.period,
            "built price chart"
        );

        Ok(Self {
            now,
            period: config.period,
            series,
            timeline,
            price_lines,
            outages,
            indexes,
            staleness,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn period(&self) -> ReportingPeriod {
        self.period
    }

    /// Series in store-id order.
    pub fn series(&self) -> &[StoreSeries] {
        &self.series
    }

    pub fn store_ids(&self) -> impl Iterator<Item = &StoreId> {
        self.series.iter().map(StoreSeries::store_id)
    }

    pub fn contains_store(&self, store: &StoreId) -> bool {
        self.indexes.contains_key(store)
    }

    pub fn timeline(&self) -> &MergedTimeline {
        &self.timeline
    }

    /// Converted price per store, one slot per timeline instant.
    pub fn price_lines(&self) -> &BTreeMap<StoreId, Vec<Option<Price>>> {
        &self.price_lines
    }

    pub fn outages(&self) -> &[OutOfStockInterval] {
        &self.outages
    }

    /// Outages as instant ranges.
    pub fn outage_spans(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.outages
            .iter()
            .filter_map(|o| o.span(&self.timeline))
            .collect()
    }

    pub fn indexes(&self) -> &BTreeMap<StoreId, NearestPointIndex> {
        &self.indexes
    }

    pub fn staleness(&self) -> &Staleness {
        &self.staleness
    }

    /// False when no store has a single price in the period. The caller
    /// should show a placeholder instead of an empty chart.
    pub fn has_displayable_prices(&self) -> bool {
        self.series.iter().any(StoreSeries::has_any_price)
    }

    /// Tooltip snapshot for a pointer at `query_time`.
    pub fn tooltip(&self, query_time: DateTime<Utc>) -> TooltipSnapshot {
        tooltip::compose(&self.indexes, &self.staleness, query_time)
    }
}

/// A tooltip ready for display: ranked and filtered by visibility.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TooltipView {
    pub anchor: Option<DateTime<Utc>>,
    pub rows: Vec<RankedEntry>,
}

/// The currently displayed chart plus legend state.
#[derive(Debug, Clone, Default)]
pub struct ChartSession {
    chart: Option<PriceChart>,
    visibility: Visibility,
}

impl ChartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a freshly built chart, returning the previous one.
    ///
    /// An isolation on a store the new chart does not have is reset.
    pub fn replace(&mut self, chart: PriceChart) -> Option<PriceChart> {
        if let Some(store) = self.visibility.isolated() {
            if !chart.contains_store(store) {
                debug!(store = %store, "isolated store missing from new chart, showing all");
                self.visibility.show_all();
            }
        }
        self.chart.replace(chart)
    }

    pub fn chart(&self) -> Option<&PriceChart> {
        self.chart.as_ref()
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Legend click on `store`. Stores the current chart does not have are
    /// ignored; returns whether the click was applied.
    pub fn toggle(&mut self, store: &StoreId) -> bool {
        let known = self.chart.as_ref().is_some_and(|c| c.contains_store(store));
        if !known {
            debug!(store = %store, "ignoring legend toggle for unknown store");
            return false;
        }
        self.visibility.toggle(store);
        true
    }

    pub fn show_all(&mut self) {
        self.visibility.show_all();
    }

    pub fn is_visible(&self, store: &StoreId) -> bool {
        self.visibility.is_visible(store)
    }

    /// Ranked tooltip rows for the visible stores. Deltas stay relative to
    /// the cheapest store overall.
    pub fn tooltip(&self, query_time: DateTime<Utc>) -> TooltipView {
        let Some(chart) = &self.chart else {
            return TooltipView::default();
        };
        let snapshot = chart.tooltip(query_time);
        TooltipView {
            anchor: snapshot.anchor,
            rows: self.visibility.filter_ranked(snapshot.ranked()),
        }
    }
}
