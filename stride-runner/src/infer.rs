//! One-shot live inference on the most recently trained snapshot.

use thiserror::Error;

use stride_core::backend::Backend;
use stride_core::memory::max_memory_size;
use stride_core::pipeline::TrainedPipeline;
use stride_core::{Artifact, EngineError, Frame, Stage};

#[derive(Debug, Error)]
pub enum InferError {
    #[error("cannot infer from an empty trained pipeline")]
    NotTrained,
    #[error("input has {rows} rows but the pipeline requires more than {memory} rows of history")]
    NotEnoughHistory { rows: usize, memory: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Predict on new data with the latest snapshot. Nothing is fitted or
/// updated; feed realized targets back through a training pass to learn from
/// them.
pub fn infer(
    trained: &TrainedPipeline,
    x: &Frame,
    backend: &dyn Backend,
) -> Result<Frame, InferError> {
    let snapshot = trained.latest().ok_or(InferError::NotTrained)?.clone();
    let memory = max_memory_size(&snapshot);
    if x.len() <= memory {
        return Err(InferError::NotEnoughHistory {
            rows: x.len(),
            memory,
        });
    }
    let output = stride_core::process(
        snapshot,
        x.clone(),
        None,
        Artifact::empty_with_index(x.index()),
        Stage::Infer,
        backend,
    )?;
    Ok(output.result)
}
