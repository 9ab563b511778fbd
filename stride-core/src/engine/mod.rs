//! Recursive pipeline execution.
//!
//! `process` is the single entry point: given a (sub)tree, a stage, and
//! data, it dispatches on the node kind and returns the possibly-mutated
//! tree together with the transformed output and side-channel artifacts.
//! The returned tree is always the authoritative one — callers must keep it.
//!
//! After every node the engine asserts the core invariant: the transformed
//! result and its artifact share the same row index.

mod composite;
mod leaf;

use crate::artifact::Artifact;
use crate::backend::Backend;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::Node;
use crate::stage::Stage;

/// The outcome of processing one (sub)tree.
pub struct ProcessOutput {
    pub node: Node,
    pub result: Frame,
    pub artifact: Artifact,
}

/// Fit/transform/update a pipeline tree on one batch of data.
pub fn process(
    node: Node,
    x: Frame,
    y: Option<&Series>,
    artifact: Artifact,
    stage: Stage,
    backend: &dyn Backend,
) -> Result<ProcessOutput, EngineError> {
    let output = match node {
        Node::Sequence(children) => process_sequence(children, x, y, artifact, stage, backend)?,
        Node::Transformation(leaf) => leaf::process_leaf(leaf, x, y, artifact, stage)?,
        Node::Composite(node) => {
            composite::process_composite(node, x, y, artifact, stage, backend)?
        }
    };
    post_check(output)
}

/// Children run strictly in series: the output of child `i` is the input of
/// child `i+1`.
fn process_sequence(
    children: Vec<Node>,
    x: Frame,
    y: Option<&Series>,
    artifact: Artifact,
    stage: Stage,
    backend: &dyn Backend,
) -> Result<ProcessOutput, EngineError> {
    let mut current_x = x;
    let mut current_artifact = artifact;
    let mut processed = Vec::with_capacity(children.len());
    for child in children {
        let output = process(child, current_x, y, current_artifact, stage, backend)?;
        processed.push(output.node);
        current_x = output.result;
        current_artifact = output.artifact;
    }
    Ok(ProcessOutput {
        node: Node::Sequence(processed),
        result: current_x,
        artifact: current_artifact,
    })
}

fn post_check(output: ProcessOutput) -> Result<ProcessOutput, EngineError> {
    if !output.artifact.aligns_with(&output.result) {
        return Err(EngineError::IndexMisalignment {
            name: output.node.name(),
        });
    }
    Ok(output)
}
