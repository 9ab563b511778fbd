//! Concrete leaf transformations.

mod date;
mod difference;
mod function;
mod identity;

pub use date::{DateFeature, DateFeatures};
pub use difference::Difference;
pub use function::ApplyFunction;
pub use identity::Identity;
