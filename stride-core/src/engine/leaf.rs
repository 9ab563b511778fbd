//! Leaf execution: memory stitching, stage dispatch, online replay.

use crate::artifact::Artifact;
use crate::engine::ProcessOutput;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::memory::{attach_memory, store_memory};
use crate::pipeline::{LeafNode, Node};
use crate::stage::Stage;
use crate::trim::first_valid_row;

pub(super) fn process_leaf(
    mut leaf: LeafNode,
    x: Frame,
    y: Option<&Series>,
    artifact: Artifact,
    stage: Stage,
) -> Result<ProcessOutput, EngineError> {
    if x.is_empty() {
        return Ok(ProcessOutput {
            node: Node::Transformation(leaf),
            result: x,
            artifact,
        });
    }

    let properties = leaf.transformation.properties();
    let weights = artifact.sample_weights();

    if stage.requires_row_replay(properties.mode) {
        return replay_online(leaf, x, y, artifact, weights.as_ref());
    }

    let attached = attach_memory(
        leaf.memory.as_ref(),
        properties.memory_size,
        &x,
        y,
        weights.as_ref(),
    );

    if stage == Stage::InitialFit {
        // Warm-up NaN rows never reach `fit`.
        let start = first_valid_row(&attached.x, attached.y.as_ref()).unwrap_or(attached.x.len());
        let end = attached.x.len();
        leaf.transformation.fit(
            &attached.x.slice(start, end),
            attached.y.as_ref().map(|s| s.slice(start, end)).as_ref(),
            attached.weights.as_ref().map(|s| s.slice(start, end)).as_ref(),
        )?;
        store_memory(
            &mut leaf.memory,
            properties.memory_size,
            &attached.x,
            attached.y.as_ref(),
            attached.weights.as_ref(),
            true,
        );
    }

    // Transform with pre-update parameters: a batch update never sees its own
    // rows' predictions.
    let (transformed, transform_artifact) =
        leaf.transformation.transform(&attached.x, stage.in_sample())?;
    let result = transformed.slice(attached.prefix_rows, transformed.len());

    let mut out_artifact = artifact;
    if let Some(extra) = transform_artifact {
        out_artifact = out_artifact.merge(&extra);
    }

    if stage.updates_minibatch() {
        let update_artifact = leaf.transformation.update(
            &attached.x,
            attached.y.as_ref(),
            attached.weights.as_ref(),
        )?;
        if let Some(extra) = update_artifact {
            out_artifact = out_artifact.merge(&extra);
        }
        store_memory(
            &mut leaf.memory,
            properties.memory_size,
            &attached.x,
            attached.y.as_ref(),
            attached.weights.as_ref(),
            false,
        );
    }

    Ok(ProcessOutput {
        node: Node::Transformation(leaf),
        result,
        artifact: out_artifact,
    })
}

/// Row-by-row replay for online leaves: predict the row with the current
/// parameters, then learn from its realized label before the next row.
fn replay_online(
    mut leaf: LeafNode,
    x: Frame,
    y: Option<&Series>,
    artifact: Artifact,
    weights: Option<&Series>,
) -> Result<ProcessOutput, EngineError> {
    let properties = leaf.transformation.properties();
    let mut rows = Vec::with_capacity(x.len());
    let mut update_artifacts = Vec::new();

    for row in 0..x.len() {
        let row_x = x.slice(row, row + 1);
        let row_y = y.map(|s| s.slice(row, row + 1));
        let row_w = weights.map(|s| s.slice(row, row + 1));

        let attached = attach_memory(
            leaf.memory.as_ref(),
            properties.memory_size,
            &row_x,
            row_y.as_ref(),
            row_w.as_ref(),
        );
        let (transformed, _) = leaf.transformation.transform(&attached.x, false)?;
        rows.push(transformed.slice(attached.prefix_rows, transformed.len()));

        if let Some(label) = &row_y {
            let emitted = leaf
                .transformation
                .update(&row_x, Some(label), row_w.as_ref())?;
            if let Some(extra) = emitted {
                update_artifacts.push(extra);
            }
            store_memory(
                &mut leaf.memory,
                properties.memory_size,
                &row_x,
                Some(label),
                row_w.as_ref(),
                false,
            );
        }
    }

    let result = Frame::concat_rows(&rows);
    let mut out_artifact = artifact;
    if !update_artifacts.is_empty() {
        out_artifact = out_artifact.merge(&Artifact::concat_rows(&update_artifacts));
    }

    Ok(ProcessOutput {
        node: Node::Transformation(leaf),
        result,
        artifact: out_artifact,
    })
}
