//! Out-of-sample replay of trained pipelines.
//!
//! Each fold's test window is scored by that fold's own snapshot, replayed
//! with `Stage::UpdateOnlineOnly` so online leaves keep learning row by row
//! while minibatch leaves stay frozen. Windows are extended backwards by the
//! tree's maximum memory size so lookback leaves see genuine history, then
//! the output is cut back to the true test window.

use thiserror::Error;

use stride_core::backend::{Backend, FoldOutput};
use stride_core::memory::max_memory_size;
use stride_core::pipeline::TrainedPipeline;
use stride_core::splitter::{Fold, SplitError, Splitter};
use stride_core::trim::{trim_initial_nans, trim_initial_nans_single};
use stride_core::{Artifact, EngineError, Frame, Series, Stage};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("no trained snapshot stored under model index {model_index}")]
    MissingModel { model_index: usize },
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Replay all test windows and concatenate the predictions. The trained
/// pipelines are left untouched; backtesting twice gives identical results.
pub fn backtest(
    trained: &TrainedPipeline,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
    sample_weights: Option<&Series>,
    backend: &dyn Backend,
    silent: bool,
) -> Result<Frame, BacktestError> {
    let outputs = backtest_over_folds(trained, x, y, splitter, sample_weights, backend, silent)?;
    Ok(concat_results(&outputs))
}

/// Like [`backtest`], also returning the concatenated artifacts.
pub fn backtest_with_artifacts(
    trained: &TrainedPipeline,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
    sample_weights: Option<&Series>,
    backend: &dyn Backend,
    silent: bool,
) -> Result<(Frame, Artifact), BacktestError> {
    let outputs = backtest_over_folds(trained, x, y, splitter, sample_weights, backend, silent)?;
    let artifacts: Vec<Artifact> = outputs.iter().map(|o| o.artifact.clone()).collect();
    Ok((concat_results(&outputs), Artifact::concat_rows(&artifacts)))
}

/// The explicit escape hatch: replace each fold's snapshot with its replayed
/// state, so online leaves keep what they learned during the backtest.
pub fn backtest_mut(
    trained: &mut TrainedPipeline,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
    sample_weights: Option<&Series>,
    backend: &dyn Backend,
    silent: bool,
) -> Result<Frame, BacktestError> {
    let outputs = backtest_over_folds(trained, x, y, splitter, sample_weights, backend, silent)?;
    let result = concat_results(&outputs);
    for output in outputs {
        trained.replace(output.model_index, output.node);
    }
    Ok(result)
}

fn backtest_over_folds(
    trained: &TrainedPipeline,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
    sample_weights: Option<&Series>,
    backend: &dyn Backend,
    silent: bool,
) -> Result<Vec<FoldOutput>, BacktestError> {
    let artifact = Artifact::from_weights(x.index(), sample_weights);
    let (x, y, artifact) = trim_initial_nans(x, y, &artifact);
    let folds = splitter.splits(x.len())?;

    // Fail on missing snapshots before any fold executes.
    for fold in &folds {
        if trained.get(fold.model_index).is_none() {
            return Err(BacktestError::MissingModel {
                model_index: fold.model_index,
            });
        }
    }

    let task = |fold: &Fold| backtest_on_window(trained, &x, &y, &artifact, fold, backend);
    Ok(backend.run_over_folds(&folds, &task, silent)?)
}

fn backtest_on_window(
    trained: &TrainedPipeline,
    x: &Frame,
    y: &Series,
    artifact: &Artifact,
    fold: &Fold,
    backend: &dyn Backend,
) -> Result<FoldOutput, EngineError> {
    // Presence is checked by the caller before any fold runs.
    let snapshot = trained
        .get(fold.model_index)
        .ok_or_else(|| {
            EngineError::transformation(
                "backtest",
                format!("no snapshot under model index {}", fold.model_index),
            )
        })?
        .clone();

    let overlap = max_memory_size(&snapshot);
    let window_start = fold.test_window_start.saturating_sub(overlap);
    let output = stride_core::process(
        snapshot,
        x.slice(window_start, fold.test_window_end),
        Some(&y.slice(window_start, fold.test_window_end)),
        artifact.slice(window_start, fold.test_window_end),
        Stage::UpdateOnlineOnly,
        backend,
    )?;

    // Cut the lookback extension back off.
    let offset = fold.test_window_start - window_start;
    Ok(FoldOutput {
        model_index: fold.model_index,
        node: output.node,
        result: output.result.slice(offset, output.result.len()),
        artifact: output.artifact.slice(offset, output.artifact.len()),
    })
}

fn concat_results(outputs: &[FoldOutput]) -> Frame {
    let frames: Vec<Frame> = outputs.iter().map(|o| o.result.clone()).collect();
    trim_initial_nans_single(&Frame::concat_rows(&frames))
}
