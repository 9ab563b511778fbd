//! Pluggable execution backends.
//!
//! The engine is execution-model agnostic: it hands independent units of
//! work (folds during training/backtesting, sibling children of a composite)
//! to a `Backend` and requires only an order-preserving gather. Sequential
//! execution is the reference implementation every other strategy must match
//! functionally — same inputs, same outputs, only latency differs.
//!
//! No fault tolerance lives here: a failed unit of work propagates its error
//! and aborts the whole call.

mod parallel;
mod sequential;

pub use parallel::ThreadPoolBackend;
pub use sequential::SequentialBackend;

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::Node;
use crate::splitter::Fold;

/// The outcome of processing one fold.
pub struct FoldOutput {
    pub model_index: usize,
    pub node: Node,
    pub result: Frame,
    pub artifact: Artifact,
}

/// The outcome of processing one composite child.
pub struct ChildOutput {
    pub node: Node,
    pub result: Frame,
    pub y: Option<Series>,
    pub artifact: Artifact,
}

/// One fold's unit of work.
pub type FoldTask<'a> = dyn Fn(&Fold) -> Result<FoldOutput, EngineError> + Sync + 'a;

/// One child's unit of work, keyed by its position among its siblings.
pub type ChildTask<'a> = dyn Fn(usize, Node) -> Result<ChildOutput, EngineError> + Sync + 'a;

/// Scheduling strategy for the engine's two parallelization axes.
pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run a task over every fold. Results come back in fold order
    /// regardless of execution order. `silent` suppresses progress output.
    fn run_over_folds(
        &self,
        folds: &[Fold],
        task: &FoldTask<'_>,
        silent: bool,
    ) -> Result<Vec<FoldOutput>, EngineError>;

    /// Run a task over a composite's children. Results come back re-associated
    /// with the original child index (order-preserving gather).
    fn process_children(
        &self,
        children: Vec<(usize, Node)>,
        task: &ChildTask<'_>,
        silent: bool,
    ) -> Result<Vec<ChildOutput>, EngineError>;
}
