//! Domain types: stores, samples and validated per-store series.

pub mod ids;
pub mod sample;
pub mod series;

pub use ids::StoreId;
pub use sample::Sample;
pub use series::StoreSeries;
