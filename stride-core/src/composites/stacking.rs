//! Stacked generalization: base learners feed one meta learner.
//!
//! Exercises the secondary child path: base learners run as primary children
//! on the raw features, the meta learner runs as the single secondary child
//! on the merged base predictions.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{Composite, CompositeProperties, FoldMetadata, Node};

#[derive(Clone)]
pub struct Stacking {
    base: Vec<Node>,
    meta: Node,
}

impl Stacking {
    pub fn new(base: Vec<Node>, meta: Node) -> Self {
        Self { base, meta }
    }
}

impl Composite for Stacking {
    fn name(&self) -> &str {
        "stacking"
    }

    fn properties(&self) -> CompositeProperties {
        CompositeProperties {
            primary_requires_predictions: true,
            secondary_only_single_pipeline: true,
            secondary_requires_predictions: true,
            ..CompositeProperties::default()
        }
    }

    fn children_primary(&self) -> Vec<Node> {
        self.base.clone()
    }

    fn children_secondary(&self) -> Option<Vec<Node>> {
        Some(vec![self.meta.clone()])
    }

    /// Base predictions merge side by side; a positional suffix keeps columns
    /// from same-named learners apart while staying prediction-shaped.
    fn postprocess_result_primary(
        &self,
        results: &[Frame],
        _y: Option<&Series>,
        _fit: bool,
    ) -> Result<Frame, EngineError> {
        let first = results.first().ok_or(EngineError::ChildArity {
            group: "primary",
            got: 0,
        })?;
        let mut merged = Frame::with_index(first.index().to_vec());
        for (position, result) in results.iter().enumerate() {
            let renamed = result
                .clone()
                .rename_columns(|name| format!("{name}_{position}"));
            merged = merged.merge_columns(&renamed);
        }
        Ok(merged)
    }

    /// The meta learner sees the merged base predictions as its features.
    fn preprocess_secondary(
        &self,
        _x: &Frame,
        y: Option<&Series>,
        artifact: &Artifact,
        results_primary: &Frame,
        _index: usize,
        _fit: bool,
    ) -> Result<(Frame, Option<Series>, Artifact), EngineError> {
        Ok((results_primary.clone(), y.cloned(), artifact.clone()))
    }

    fn set_metadata(&mut self, metadata: &FoldMetadata) {
        for child in &mut self.base {
            child.set_metadata(metadata);
        }
        self.meta.set_metadata(metadata);
    }

    fn clone_with_children(
        &self,
        primary: Vec<Node>,
        secondary: Option<Vec<Node>>,
    ) -> Box<dyn Composite> {
        let meta = secondary
            .and_then(|mut children| {
                if children.is_empty() {
                    None
                } else {
                    Some(children.remove(0))
                }
            })
            .unwrap_or_else(|| self.meta.clone());
        Box::new(Stacking {
            base: primary,
            meta,
        })
    }

    fn clone_box(&self) -> Box<dyn Composite> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SequentialBackend;
    use crate::engine::process;
    use crate::model::{Constant, RunningMean};
    use crate::stage::Stage;

    #[test]
    fn meta_learner_consumes_base_predictions() {
        let node = Node::composite(Stacking::new(
            vec![
                Node::leaf(Constant::new(1.0)),
                Node::leaf(Constant::new(3.0)),
            ],
            Node::leaf(RunningMean::new()),
        ));
        let index = vec![0, 1, 2, 3];
        let x = Frame::single("a", index.clone(), vec![0.0; 4]);
        let y = Series::new("y", index.clone(), vec![2.0; 4]);
        let artifact = Artifact::empty_with_index(&index);
        let out = process(
            node,
            x,
            Some(&y),
            artifact,
            Stage::InitialFit,
            &SequentialBackend::new(),
        )
        .unwrap();
        // The final output is the meta learner's prediction of the target.
        assert_eq!(
            out.result.column("predictions_running_mean").unwrap(),
            &[2.0; 4]
        );
    }

    #[test]
    fn merged_base_columns_stay_prediction_shaped() {
        let stacking = Stacking::new(
            vec![Node::leaf(Constant::new(0.0))],
            Node::leaf(RunningMean::new()),
        );
        let result = Frame::single("predictions_constant", vec![0], vec![1.0]);
        let merged = stacking
            .postprocess_result_primary(&[result.clone(), result], None, true)
            .unwrap();
        assert!(crate::frame::is_prediction(&merged));
        assert_eq!(merged.num_columns(), 2);
    }
}
