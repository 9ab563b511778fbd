//! Composite nodes: fan-out/merge strategies over child pipelines.

mod cache;
mod ensemble;
mod select;
mod stacking;

pub use cache::Cache;
pub use ensemble::Ensemble;
pub use select::SelectBest;
pub use stacking::Stacking;
