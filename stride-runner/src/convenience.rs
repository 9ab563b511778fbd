//! One-call wrappers for the common train-then-backtest workflow.

use anyhow::Context;

use stride_core::pipeline::{Node, TrainedPipeline};
use stride_core::splitter::Splitter;
use stride_core::{Frame, SequentialBackend, Series};

use crate::backtest::backtest;
use crate::train::{train, TrainMethod};

/// Train on every fold, then replay the test windows out of sample. Runs
/// sequentially and silently; reach for [`train`] and [`backtest`] directly
/// when you need a backend, sample weights, or a different train method.
pub fn train_backtest(
    pipeline: &Node,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
) -> anyhow::Result<(Frame, TrainedPipeline)> {
    let backend = SequentialBackend::new();
    let trained = train(
        pipeline,
        x,
        y,
        splitter,
        None,
        TrainMethod::Parallel,
        &backend,
        true,
    )
    .context("walk-forward training failed")?;
    let predictions = backtest(&trained, x, y, splitter, None, &backend, true)
        .context("backtesting the trained pipelines failed")?;
    Ok((predictions, trained))
}
