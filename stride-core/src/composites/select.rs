//! Candidate selection: run exactly one of several alternatives.

use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{Composite, CompositeProperties, FoldMetadata, Node};

/// Holds several candidate pipelines but exposes only the selected one to the
/// engine. Unselected candidates are carried untouched, so selection can be
/// changed between runs without rebuilding the tree.
#[derive(Clone)]
pub struct SelectBest {
    candidates: Vec<Node>,
    selected: usize,
}

impl SelectBest {
    /// Defaults to the first candidate.
    pub fn new(candidates: Vec<Node>) -> Self {
        Self {
            candidates,
            selected: 0,
        }
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        assert!(selected < self.candidates.len(), "selected out of range");
        self.selected = selected;
        self
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}

impl Composite for SelectBest {
    fn name(&self) -> &str {
        "select_best"
    }

    fn properties(&self) -> CompositeProperties {
        CompositeProperties::default()
    }

    fn children_primary(&self) -> Vec<Node> {
        self.candidates
            .get(self.selected)
            .cloned()
            .into_iter()
            .collect()
    }

    fn postprocess_result_primary(
        &self,
        results: &[Frame],
        _y: Option<&Series>,
        _fit: bool,
    ) -> Result<Frame, EngineError> {
        results.first().cloned().ok_or(EngineError::ChildArity {
            group: "primary",
            got: 0,
        })
    }

    fn set_metadata(&mut self, metadata: &FoldMetadata) {
        for candidate in &mut self.candidates {
            candidate.set_metadata(metadata);
        }
    }

    fn clone_with_children(
        &self,
        primary: Vec<Node>,
        _secondary: Option<Vec<Node>>,
    ) -> Box<dyn Composite> {
        let mut candidates = self.candidates.clone();
        if let (Some(slot), Some(processed)) =
            (candidates.get_mut(self.selected), primary.into_iter().next())
        {
            *slot = processed;
        }
        Box::new(SelectBest {
            candidates,
            selected: self.selected,
        })
    }

    fn clone_box(&self) -> Box<dyn Composite> {
        Box::new(self.clone())
    }
}
