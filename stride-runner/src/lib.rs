//! Walk-forward drivers on top of `stride-core`.
//!
//! Three entry points mirror the lifecycle of a deployed pipeline:
//! [`train`] fits one tree snapshot per fold of a splitter, [`backtest`]
//! replays the test windows out of sample against those snapshots, and
//! [`infer`] predicts on fresh data with the latest one. [`train_backtest`]
//! wraps the first two for the common case.

pub mod backtest;
pub mod convenience;
pub mod infer;
pub mod train;

pub use backtest::{backtest, backtest_mut, backtest_with_artifacts, BacktestError};
pub use convenience::train_backtest;
pub use infer::{infer, InferError};
pub use train::{train, train_for_deployment, TrainError, TrainMethod};
