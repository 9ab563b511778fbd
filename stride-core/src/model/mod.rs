//! Estimator-style leaves. Their outputs are prediction-shaped frames
//! (columns prefixed `predictions_`), which is what prediction-requiring
//! composites assert on.

mod constant;
mod mean;
mod naive;

pub use constant::Constant;
pub use mean::RunningMean;
pub use naive::Naive;
