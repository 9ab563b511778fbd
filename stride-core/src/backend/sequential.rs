//! In-process sequential execution — the reference backend.

use crate::backend::{Backend, ChildOutput, ChildTask, FoldOutput, FoldTask};
use crate::error::EngineError;
use crate::pipeline::Node;
use crate::splitter::Fold;

/// Runs every unit of work in a plain loop on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl SequentialBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn run_over_folds(
        &self,
        folds: &[Fold],
        task: &FoldTask<'_>,
        silent: bool,
    ) -> Result<Vec<FoldOutput>, EngineError> {
        let mut outputs = Vec::with_capacity(folds.len());
        for (done, fold) in folds.iter().enumerate() {
            if !silent {
                eprintln!("[stride] fold {}/{}", done + 1, folds.len());
            }
            outputs.push(task(fold)?);
        }
        Ok(outputs)
    }

    fn process_children(
        &self,
        children: Vec<(usize, Node)>,
        task: &ChildTask<'_>,
        _silent: bool,
    ) -> Result<Vec<ChildOutput>, EngineError> {
        children
            .into_iter()
            .map(|(index, child)| task(index, child))
            .collect()
    }
}
