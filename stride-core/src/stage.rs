//! Execution stages — the state machine governing fit / update / inference.
//!
//! The active stage is selected per fold and per call site, not sequenced as
//! a single automaton: fold 0 (or a never-updating train method) fits from
//! scratch, later folds update incrementally, backtesting replays with
//! `UpdateOnlineOnly`, and live prediction uses `Infer`.

use serde::{Deserialize, Serialize};

use crate::pipeline::TransformMode;

/// Execution mode for one traversal of the pipeline tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Fit from scratch on the train window.
    InitialFit,
    /// Incremental parameter update on the newly arrived window.
    Update,
    /// Backtest replay: online-mode leaves keep learning row-by-row,
    /// minibatch-mode leaves run pure inference.
    UpdateOnlineOnly,
    /// One-shot prediction, no fitting or updating anywhere.
    Infer,
}

impl Stage {
    /// Whether composites should treat this traversal as a fitting pass when
    /// shaping their children's views.
    pub fn is_fit_or_update(self) -> bool {
        matches!(self, Stage::InitialFit | Stage::Update)
    }

    /// In-sample transform semantics apply only to the initial fit, where a
    /// node scores the very rows it was fitted on.
    pub fn in_sample(self) -> bool {
        matches!(self, Stage::InitialFit)
    }

    /// Whether a leaf with the given mode must be replayed row-by-row
    /// (predict-then-learn) instead of processed as one batch.
    pub fn requires_row_replay(self, mode: TransformMode) -> bool {
        mode == TransformMode::Online && matches!(self, Stage::Update | Stage::UpdateOnlineOnly)
    }

    /// Whether a minibatch leaf performs a batch update in this stage.
    pub fn updates_minibatch(self) -> bool {
        matches!(self, Stage::Update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn online_replay_only_in_update_stages() {
        assert!(Stage::Update.requires_row_replay(TransformMode::Online));
        assert!(Stage::UpdateOnlineOnly.requires_row_replay(TransformMode::Online));
        assert!(!Stage::InitialFit.requires_row_replay(TransformMode::Online));
        assert!(!Stage::Infer.requires_row_replay(TransformMode::Online));
        assert!(!Stage::Update.requires_row_replay(TransformMode::Minibatch));
    }

    #[test]
    fn backtest_replay_is_not_a_fitting_pass() {
        assert!(Stage::InitialFit.is_fit_or_update());
        assert!(Stage::Update.is_fit_or_update());
        assert!(!Stage::UpdateOnlineOnly.is_fit_or_update());
        assert!(!Stage::Infer.is_fit_or_update());
    }

    #[test]
    fn only_initial_fit_is_in_sample() {
        assert!(Stage::InitialFit.in_sample());
        assert!(!Stage::Update.in_sample());
        assert!(!Stage::UpdateOnlineOnly.in_sample());
        assert!(!Stage::Infer.in_sample());
    }
}
