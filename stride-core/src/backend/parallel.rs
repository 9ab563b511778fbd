//! Thread-pool execution via rayon.
//!
//! Both operations fan units of work out over rayon's global pool and gather
//! results back in submission order (`collect` on an indexed parallel
//! iterator preserves ordering). Functionally identical to the sequential
//! backend; only latency differs.

use rayon::prelude::*;

use crate::backend::{Backend, ChildOutput, ChildTask, FoldOutput, FoldTask};
use crate::error::EngineError;
use crate::pipeline::Node;
use crate::splitter::Fold;

/// Data-parallel backend over rayon's thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPoolBackend;

impl ThreadPoolBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ThreadPoolBackend {
    fn name(&self) -> &'static str {
        "thread-pool"
    }

    fn run_over_folds(
        &self,
        folds: &[Fold],
        task: &FoldTask<'_>,
        _silent: bool,
    ) -> Result<Vec<FoldOutput>, EngineError> {
        folds.par_iter().map(task).collect()
    }

    fn process_children(
        &self,
        children: Vec<(usize, Node)>,
        task: &ChildTask<'_>,
        _silent: bool,
    ) -> Result<Vec<ChildOutput>, EngineError> {
        children
            .into_par_iter()
            .map(|(index, child)| task(index, child))
            .collect()
    }
}
