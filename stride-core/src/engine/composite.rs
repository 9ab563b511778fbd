//! Composite execution: fan out to children, enforce shape contracts, merge.

use crate::artifact::Artifact;
use crate::backend::{Backend, ChildOutput};
use crate::engine::{process, ProcessOutput};
use crate::error::EngineError;
use crate::frame::{is_prediction, Frame, Series};
use crate::pipeline::{Composite, Node};
use crate::stage::Stage;

pub(super) fn process_composite(
    mut composite: Box<dyn Composite>,
    x: Frame,
    y: Option<&Series>,
    artifact: Artifact,
    stage: Stage,
    backend: &dyn Backend,
) -> Result<ProcessOutput, EngineError> {
    let fit = stage.is_fit_or_update();
    if fit {
        composite.before_fit(&x);
    }
    let properties = composite.properties();

    let primary_children = composite.children_primary();
    check_arity(
        "primary",
        primary_children.len(),
        properties.primary_only_single_pipeline,
    )?;

    let primary_task = |index: usize, child: Node| -> Result<ChildOutput, EngineError> {
        let (child_x, child_y, child_artifact) =
            composite.preprocess_primary(&x, y, &artifact, index, fit)?;
        let output = process(child, child_x, child_y.as_ref(), child_artifact, stage, backend)?;
        Ok(ChildOutput {
            node: output.node,
            result: output.result,
            y: child_y,
            artifact: output.artifact,
        })
    };
    let primary_outputs = backend.process_children(enumerate(primary_children), &primary_task, true)?;

    let (primary_nodes, primary_results, primary_ys, primary_artifacts) = split(primary_outputs);
    check_shapes(
        composite.as_ref(),
        &primary_results,
        &primary_artifacts,
        "primary",
        properties.primary_requires_predictions,
        properties.artifacts_length_should_match,
    )?;

    let first_y = primary_ys.first().and_then(|y| y.as_ref());
    let merged_result = composite.postprocess_result_primary(&primary_results, first_y, fit)?;
    let merged_artifact =
        composite.postprocess_artifacts_primary(&primary_artifacts, &primary_results, &artifact, fit)?;

    let Some(secondary_children) = composite.children_secondary() else {
        let node = composite.clone_with_children(primary_nodes, None);
        return Ok(ProcessOutput {
            node: Node::Composite(node),
            result: merged_result,
            artifact: merged_artifact,
        });
    };

    check_arity(
        "secondary",
        secondary_children.len(),
        properties.secondary_only_single_pipeline,
    )?;

    let secondary_task = |index: usize, child: Node| -> Result<ChildOutput, EngineError> {
        let (child_x, child_y, child_artifact) =
            composite.preprocess_secondary(&x, y, &artifact, &merged_result, index, fit)?;
        let output = process(child, child_x, child_y.as_ref(), child_artifact, stage, backend)?;
        Ok(ChildOutput {
            node: output.node,
            result: output.result,
            y: child_y,
            artifact: output.artifact,
        })
    };
    let secondary_outputs =
        backend.process_children(enumerate(secondary_children), &secondary_task, true)?;

    let (secondary_nodes, secondary_results, _, secondary_artifacts) = split(secondary_outputs);
    check_shapes(
        composite.as_ref(),
        &secondary_results,
        &secondary_artifacts,
        "secondary",
        properties.secondary_requires_predictions,
        properties.artifacts_length_should_match,
    )?;

    let final_result = composite.postprocess_result_secondary(
        &merged_result,
        &secondary_results,
        y,
        stage.in_sample(),
    )?;
    let final_artifact =
        composite.postprocess_artifacts_secondary(&merged_artifact, &secondary_artifacts, &artifact)?;

    let node = composite.clone_with_children(primary_nodes, Some(secondary_nodes));
    Ok(ProcessOutput {
        node: Node::Composite(node),
        result: final_result,
        artifact: final_artifact,
    })
}

fn enumerate(children: Vec<Node>) -> Vec<(usize, Node)> {
    children.into_iter().enumerate().collect()
}

fn split(
    outputs: Vec<ChildOutput>,
) -> (Vec<Node>, Vec<Frame>, Vec<Option<Series>>, Vec<Artifact>) {
    let mut nodes = Vec::with_capacity(outputs.len());
    let mut results = Vec::with_capacity(outputs.len());
    let mut ys = Vec::with_capacity(outputs.len());
    let mut artifacts = Vec::with_capacity(outputs.len());
    for output in outputs {
        nodes.push(output.node);
        results.push(output.result);
        ys.push(output.y);
        artifacts.push(output.artifact);
    }
    (nodes, results, ys, artifacts)
}

fn check_arity(group: &'static str, got: usize, only_single: bool) -> Result<(), EngineError> {
    if got == 0 || (only_single && got != 1) {
        return Err(EngineError::ChildArity { group, got });
    }
    Ok(())
}

fn check_shapes(
    composite: &dyn Composite,
    results: &[Frame],
    artifacts: &[Artifact],
    group: &'static str,
    requires_predictions: bool,
    artifacts_length_should_match: bool,
) -> Result<(), EngineError> {
    for (result, artifact) in results.iter().zip(artifacts) {
        if requires_predictions && !is_prediction(result) {
            return Err(EngineError::ExpectedPredictions {
                group,
                name: composite.name().to_string(),
            });
        }
        if artifacts_length_should_match && artifact.len() != result.len() {
            return Err(EngineError::ArtifactLengthMismatch {
                name: composite.name().to_string(),
                result_rows: result.len(),
                artifact_rows: artifact.len(),
            });
        }
    }
    Ok(())
}
