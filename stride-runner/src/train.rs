//! Walk-forward training over all folds of a split.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stride_core::backend::{Backend, FoldOutput};
use stride_core::pipeline::{FoldMetadata, Node, TrainedFold, TrainedPipeline};
use stride_core::splitter::{Fold, SplitError, Splitter};
use stride_core::{Artifact, EngineError, Frame, Series, Stage};

/// How fitted state flows between folds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainMethod {
    /// Every fold fits from scratch on its own train window. Folds are
    /// independent, so they can run on any backend.
    Parallel,
    /// Fold `i + 1` resumes fold `i`'s fitted state and only processes the
    /// update window. Strictly ordered.
    Sequential,
    /// Fold 0 fits from scratch; every later fold updates from fold 0's
    /// state, independently of each other.
    ParallelWithSearch,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("a sliding window discards history, so only TrainMethod::Parallel is coherent with it")]
    IncompatibleTrainMethod,
    #[error("the splitter generated no folds for {length} rows")]
    NoFolds { length: usize },
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Train a pipeline for every fold of the split. Returns one fitted tree
/// snapshot per fold, stored under the fold's `model_index`.
pub fn train(
    pipeline: &Node,
    x: &Frame,
    y: &Series,
    splitter: &dyn Splitter,
    sample_weights: Option<&Series>,
    train_method: TrainMethod,
    backend: &dyn Backend,
    silent: bool,
) -> Result<TrainedPipeline, TrainError> {
    if splitter.requires_parallel_training() && train_method != TrainMethod::Parallel {
        return Err(TrainError::IncompatibleTrainMethod);
    }
    let folds = splitter.splits(x.len())?;
    if folds.is_empty() {
        return Err(TrainError::NoFolds { length: x.len() });
    }
    let artifact = Artifact::from_weights(x.index(), sample_weights);

    let outputs = match train_method {
        TrainMethod::Parallel => {
            let task = |fold: &Fold| train_on_window(pipeline, x, y, &artifact, fold, true, backend);
            backend.run_over_folds(&folds, &task, silent)?
        }
        TrainMethod::Sequential => {
            let mut outputs = Vec::with_capacity(folds.len());
            let mut current = pipeline.clone();
            for fold in &folds {
                let output = train_on_window(&current, x, y, &artifact, fold, false, backend)?;
                current = output.node.clone();
                outputs.push(output);
            }
            outputs
        }
        TrainMethod::ParallelWithSearch => {
            let first = train_on_window(pipeline, x, y, &artifact, &folds[0], true, backend)?;
            let task =
                |fold: &Fold| train_on_window(&first.node, x, y, &artifact, fold, false, backend);
            let mut outputs = backend.run_over_folds(&folds[1..], &task, silent)?;
            outputs.insert(0, first);
            outputs
        }
    };

    Ok(TrainedPipeline::new(
        outputs
            .into_iter()
            .map(|output| TrainedFold {
                model_index: output.model_index,
                node: output.node,
            })
            .collect(),
    ))
}

/// Fit the pipeline on the whole dataset at once, for live deployment. The
/// snapshot is stored under `model_index = 0`.
pub fn train_for_deployment(
    pipeline: &Node,
    x: &Frame,
    y: &Series,
    sample_weights: Option<&Series>,
    backend: &dyn Backend,
) -> Result<TrainedPipeline, TrainError> {
    let fold = Fold {
        order: 0,
        model_index: 0,
        train_window_start: 0,
        train_window_end: x.len(),
        update_window_start: x.len(),
        update_window_end: x.len(),
        test_window_start: x.len(),
        test_window_end: x.len(),
    };
    let artifact = Artifact::from_weights(x.index(), sample_weights);
    let output = train_on_window(pipeline, x, y, &artifact, &fold, true, backend)?;
    Ok(TrainedPipeline::new(vec![TrainedFold {
        model_index: 0,
        node: output.node,
    }]))
}

fn train_on_window(
    pipeline: &Node,
    x: &Frame,
    y: &Series,
    artifact: &Artifact,
    fold: &Fold,
    never_update: bool,
    backend: &dyn Backend,
) -> Result<FoldOutput, EngineError> {
    let stage = if fold.order == 0 || never_update {
        Stage::InitialFit
    } else {
        Stage::Update
    };
    let (start, end) = match stage {
        Stage::Update => (fold.update_window_start, fold.update_window_end),
        _ => (fold.train_window_start, fold.train_window_end),
    };

    let mut tree = pipeline.clone();
    tree.set_metadata(&FoldMetadata {
        fold_index: fold.order,
        target: y.name().to_string(),
    });
    let output = stride_core::process(
        tree,
        x.slice(start, end),
        Some(&y.slice(start, end)),
        artifact.slice(start, end),
        stage,
        backend,
    )?;
    Ok(FoldOutput {
        model_index: fold.model_index,
        node: output.node,
        result: output.result,
        artifact: output.artifact,
    })
}
