//! The pipeline tree: leaf transformations, composites, and sequences.
//!
//! A pipeline is a closed tagged union (`Node`) the engine dispatches on
//! exhaustively. Leaves own private fitted state behind the `Transformation`
//! trait; composites fan out to primary (and optionally secondary) child
//! pipelines behind the `Composite` trait; sequences run children in series.
//!
//! Nodes have value semantics: every fold clones its own tree before
//! training (clone-on-fork), so folds never share mutable state, and
//! parallel branches never alias each other.

mod trained;

pub use trained::{TrainedFold, TrainedPipeline};

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::memory::Memory;

/// Whether a leaf learns from whole batches or row-by-row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformMode {
    /// Fit/update on whole windows at a time.
    Minibatch,
    /// Update after every row; replayed with predict-then-learn ordering.
    Online,
}

/// Static capabilities a leaf declares to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformProperties {
    /// The leaf's output at row `t` depends on rows before `t`.
    pub requires_past_x: bool,
    /// Rows of trailing history to retain across batch boundaries.
    /// `None`: no memory. `Some(0)`: whatever the last batch contained.
    /// `Some(k)`: the trailing `k` rows.
    pub memory_size: Option<usize>,
    pub mode: TransformMode,
}

impl Default for TransformProperties {
    fn default() -> Self {
        Self {
            requires_past_x: false,
            memory_size: None,
            mode: TransformMode::Minibatch,
        }
    }
}

/// Static capabilities a composite declares to the engine. Violations of the
/// arity/shape constraints are fatal configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeProperties {
    pub primary_only_single_pipeline: bool,
    pub primary_requires_predictions: bool,
    pub secondary_only_single_pipeline: bool,
    pub secondary_requires_predictions: bool,
    pub artifacts_length_should_match: bool,
}

impl Default for CompositeProperties {
    fn default() -> Self {
        Self {
            primary_only_single_pipeline: false,
            primary_requires_predictions: false,
            secondary_only_single_pipeline: false,
            secondary_requires_predictions: false,
            artifacts_length_should_match: true,
        }
    }
}

/// Per-fold context handed down the tree before training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldMetadata {
    pub fold_index: usize,
    pub target: String,
}

/// A leaf transformation: owns private fitted state, transforms batches, and
/// optionally learns incrementally.
///
/// Implementations derive `Clone` and return themselves from `clone_box`;
/// cloning must deep-copy all fitted state.
pub trait Transformation: Send + Sync {
    /// Stable name, also used to label prediction columns.
    fn name(&self) -> &str;

    fn properties(&self) -> TransformProperties;

    /// Fit from scratch on a train window. Leading NaN rows have already
    /// been trimmed by the engine.
    fn fit(
        &mut self,
        x: &Frame,
        y: Option<&Series>,
        sample_weights: Option<&Series>,
    ) -> Result<(), EngineError>;

    /// Lightweight incremental update on newly arrived rows. May emit an
    /// artifact (diagnostics, realized labels) merged into the side channel.
    fn update(
        &mut self,
        x: &Frame,
        y: Option<&Series>,
        sample_weights: Option<&Series>,
    ) -> Result<Option<Artifact>, EngineError>;

    /// Transform a batch. `in_sample` is true only during the initial fit,
    /// where the node scores the rows it was fitted on and may behave
    /// differently to avoid leaking its own training residuals.
    ///
    /// The output must keep the input's row index.
    fn transform(&self, x: &Frame, in_sample: bool) -> Result<(Frame, Option<Artifact>), EngineError>;

    /// Recover original-scale values from transformed ones. Only invertible
    /// transformations implement this.
    fn inverse_transform(&self, _series: &Series) -> Result<Series, EngineError> {
        Err(EngineError::InverseUnsupported {
            name: self.name().to_string(),
        })
    }

    /// Receive the fold context before training. Most leaves ignore it.
    fn set_metadata(&mut self, _metadata: &FoldMetadata) {}

    fn clone_box(&self) -> Box<dyn Transformation>;
}

impl Clone for Box<dyn Transformation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A composite node: fans out to child pipelines and merges their outputs.
///
/// The engine drives the hooks in a fixed order: `before_fit`, then per
/// primary child `preprocess_primary` → recurse, then
/// `postprocess_result_primary` / `postprocess_artifacts_primary`; the same
/// again for secondary children with the merged primary result available.
///
/// Implementations that hold children must forward `set_metadata` to them.
pub trait Composite: Send + Sync {
    fn name(&self) -> &str;

    fn properties(&self) -> CompositeProperties;

    /// Called once per traversal before any child runs.
    fn before_fit(&mut self, _x: &Frame) {}

    /// The primary children for this traversal. May depend on fitted state
    /// (e.g. a selection composite exposing only its chosen candidate).
    fn children_primary(&self) -> Vec<Node>;

    fn children_secondary(&self) -> Option<Vec<Node>> {
        None
    }

    /// Shape child `index`'s view of the data.
    fn preprocess_primary(
        &self,
        x: &Frame,
        y: Option<&Series>,
        artifact: &Artifact,
        _index: usize,
        _fit: bool,
    ) -> Result<(Frame, Option<Series>, Artifact), EngineError> {
        Ok((x.clone(), y.cloned(), artifact.clone()))
    }

    /// Shape secondary child `index`'s view; the merged primary result is
    /// available (e.g. a meta-learner consuming base predictions).
    fn preprocess_secondary(
        &self,
        x: &Frame,
        y: Option<&Series>,
        artifact: &Artifact,
        _results_primary: &Frame,
        _index: usize,
        _fit: bool,
    ) -> Result<(Frame, Option<Series>, Artifact), EngineError> {
        Ok((x.clone(), y.cloned(), artifact.clone()))
    }

    /// Merge primary child results into one table.
    fn postprocess_result_primary(
        &self,
        results: &[Frame],
        y: Option<&Series>,
        fit: bool,
    ) -> Result<Frame, EngineError>;

    /// Merge primary child artifacts; defaults to a last-wins column merge
    /// aligned on the first child's index.
    fn postprocess_artifacts_primary(
        &self,
        primary_artifacts: &[Artifact],
        _results: &[Frame],
        _original_artifact: &Artifact,
        _fit: bool,
    ) -> Result<Artifact, EngineError> {
        Ok(merge_artifacts(primary_artifacts))
    }

    /// Merge the primary result with secondary child results; defaults to
    /// the first secondary result.
    fn postprocess_result_secondary(
        &self,
        _primary: &Frame,
        secondary: &[Frame],
        _y: Option<&Series>,
        _in_sample: bool,
    ) -> Result<Frame, EngineError> {
        secondary.first().cloned().ok_or(EngineError::ChildArity {
            group: "secondary",
            got: 0,
        })
    }

    fn postprocess_artifacts_secondary(
        &self,
        primary: &Artifact,
        secondary: &[Artifact],
        _original_artifact: &Artifact,
    ) -> Result<Artifact, EngineError> {
        let mut merged = primary.clone();
        for artifact in secondary {
            merged = merged.merge(artifact);
        }
        Ok(merged)
    }

    fn set_metadata(&mut self, _metadata: &FoldMetadata) {}

    /// Rebuild this composite around processed children, preserving all other
    /// state. The engine uses this so the returned tree is always the
    /// authoritative, up-to-date one.
    fn clone_with_children(&self, primary: Vec<Node>, secondary: Option<Vec<Node>>)
        -> Box<dyn Composite>;

    fn clone_box(&self) -> Box<dyn Composite>;
}

impl Clone for Box<dyn Composite> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

pub(crate) fn merge_artifacts(artifacts: &[Artifact]) -> Artifact {
    let Some(first) = artifacts.first() else {
        return Artifact::default();
    };
    let mut merged = first.clone();
    for artifact in &artifacts[1..] {
        merged = merged.merge(artifact);
    }
    merged
}

/// A leaf position in the tree: the transformation plus its lookback memory.
#[derive(Clone)]
pub struct LeafNode {
    pub transformation: Box<dyn Transformation>,
    pub memory: Option<Memory>,
}

impl LeafNode {
    pub fn new(transformation: Box<dyn Transformation>) -> Self {
        Self {
            transformation,
            memory: None,
        }
    }
}

/// A pipeline tree node.
#[derive(Clone)]
pub enum Node {
    Transformation(LeafNode),
    Composite(Box<dyn Composite>),
    Sequence(Vec<Node>),
}

impl Node {
    pub fn leaf(transformation: impl Transformation + 'static) -> Node {
        Node::Transformation(LeafNode::new(Box::new(transformation)))
    }

    pub fn composite(composite: impl Composite + 'static) -> Node {
        Node::Composite(Box::new(composite))
    }

    pub fn sequence(children: Vec<Node>) -> Node {
        Node::Sequence(children)
    }

    pub fn name(&self) -> String {
        match self {
            Node::Transformation(leaf) => leaf.transformation.name().to_string(),
            Node::Composite(composite) => composite.name().to_string(),
            Node::Sequence(children) => {
                let names: Vec<String> = children.iter().map(Node::name).collect();
                format!("[{}]", names.join(", "))
            }
        }
    }

    /// Push fold context down the whole tree.
    pub fn set_metadata(&mut self, metadata: &FoldMetadata) {
        match self {
            Node::Transformation(leaf) => leaf.transformation.set_metadata(metadata),
            Node::Composite(composite) => composite.set_metadata(metadata),
            Node::Sequence(children) => {
                for child in children {
                    child.set_metadata(metadata);
                }
            }
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.name())
    }
}
