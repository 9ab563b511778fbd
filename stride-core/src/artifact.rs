//! Side-channel per-row outputs travelling alongside the transformed data.
//!
//! An `Artifact` is a `Frame` whose index must always equal the index of the
//! `X` it travels with; the engine asserts this at every node boundary.
//! Sample weights ride along as a reserved column so they survive window
//! slicing together with everything else.

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, Series};

/// Reserved column name for per-row sample weights.
pub const SAMPLE_WEIGHT_COLUMN: &str = "sample_weight";

/// Auxiliary per-row table (labels, weights, diagnostics).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Artifact {
    frame: Frame,
}

impl Artifact {
    pub fn from_frame(frame: Frame) -> Self {
        Self { frame }
    }

    /// An artifact with rows for every label but no columns.
    pub fn empty_with_index(index: &[i64]) -> Self {
        Self {
            frame: Frame::with_index(index.to_vec()),
        }
    }

    /// Build the initial artifact for a dataset, carrying sample weights when
    /// given. Weights must be aligned with `index`.
    pub fn from_weights(index: &[i64], weights: Option<&Series>) -> Self {
        let mut frame = Frame::with_index(index.to_vec());
        if let Some(w) = weights {
            assert_eq!(w.index(), index, "sample weights must align with the dataset");
            frame.push_column(SAMPLE_WEIGHT_COLUMN, w.values().to_vec());
        }
        Self { frame }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn index(&self) -> &[i64] {
        self.frame.index()
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> Artifact {
        Artifact {
            frame: self.frame.slice(start, end),
        }
    }

    pub fn reindex(&self, target: &[i64]) -> Artifact {
        Artifact {
            frame: self.frame.reindex(target),
        }
    }

    pub fn concat_rows(parts: &[Artifact]) -> Artifact {
        let frames: Vec<Frame> = parts.iter().map(|a| a.frame.clone()).collect();
        let mut non_empty = frames.iter().filter(|f| !f.is_empty()).peekable();
        if non_empty.peek().is_none() {
            return Artifact::default();
        }
        Artifact {
            frame: Frame::concat_rows(&frames),
        }
    }

    /// Column-wise merge; the incoming artifact's columns win on collision.
    /// The other artifact is re-aligned onto this artifact's index first.
    pub fn merge(&self, other: &Artifact) -> Artifact {
        if other.frame.num_columns() == 0 {
            return self.clone();
        }
        let aligned = other.frame.reindex(self.index());
        Artifact {
            frame: self.frame.merge_columns(&aligned),
        }
    }

    /// The per-row sample weights, if this artifact carries any.
    pub fn sample_weights(&self) -> Option<Series> {
        self.frame
            .column(SAMPLE_WEIGHT_COLUMN)
            .map(|values| Series::new(SAMPLE_WEIGHT_COLUMN, self.index().to_vec(), values.to_vec()))
    }

    /// True when this artifact's index matches the given frame's index.
    pub fn aligns_with(&self, frame: &Frame) -> bool {
        self.index() == frame.index()
    }
}
