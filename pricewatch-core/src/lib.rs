//! Pricewatch Core — multi-store price history alignment and lookup.
//!
//! Takes independently sampled per-store histories and turns them into
//! something a chart can draw and a pointer can query:
//! - Currency normalization into one canonical currency
//! - A merged, deduplicated timeline shared by every store
//! - Hour-bucketed detection of shared stock outages
//! - Per-store nearest-point indexes
//! - Two-phase tooltip composition with ranking against the cheapest store
//! - Legend visibility (isolate one store / show all)

pub mod batch;
pub mod chart;
pub mod config;
pub mod currency;
pub mod domain;
pub mod error;
pub mod index;
pub mod outage;
pub mod period;
pub mod timeline;
pub mod tooltip;
pub mod visibility;

pub use batch::{RawSample, StoreBatch};
pub use chart::{ChartSession, PriceChart, TooltipView};
pub use config::EngineConfig;
pub use currency::{CurrencyRate, Price};
pub use domain::{Sample, StoreId, StoreSeries};
pub use error::{EngineError, Result};
pub use index::NearestPointIndex;
pub use outage::{OutOfStockDetector, OutOfStockInterval};
pub use period::ReportingPeriod;
pub use timeline::MergedTimeline;
pub use tooltip::{RankedEntry, Staleness, TooltipEntry, TooltipSnapshot};
pub use visibility::Visibility;
