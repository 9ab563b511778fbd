//! Per-fold trained pipeline snapshots.

use crate::pipeline::Node;

/// One fold's fitted tree, stored under its stable `model_index` label.
#[derive(Debug, Clone)]
pub struct TrainedFold {
    pub model_index: usize,
    pub node: Node,
}

/// The fitted pipelines for all folds, looked up by `model_index` during
/// backtesting and inference. Snapshots are immutable once produced unless
/// the caller explicitly opts into in-place mutation.
#[derive(Debug, Clone, Default)]
pub struct TrainedPipeline {
    entries: Vec<TrainedFold>,
}

impl TrainedPipeline {
    pub fn new(mut entries: Vec<TrainedFold>) -> Self {
        entries.sort_by_key(|e| e.model_index);
        Self { entries }
    }

    pub fn get(&self, model_index: usize) -> Option<&Node> {
        self.entries
            .iter()
            .find(|e| e.model_index == model_index)
            .map(|e| &e.node)
    }

    /// Replace a fold's snapshot — the explicit escape hatch used by
    /// mutating backtests and long-running live deployments.
    pub fn replace(&mut self, model_index: usize, node: Node) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.model_index == model_index)
        {
            entry.node = node;
        }
    }

    /// The most recently trained snapshot, used for live inference.
    pub fn latest(&self) -> Option<&Node> {
        self.entries.last().map(|e| &e.node)
    }

    pub fn model_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.model_index).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
