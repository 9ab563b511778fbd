//! Lookback memory across batch boundaries.
//!
//! Per-fold batch windows are disjoint, but a leaf with `memory_size = k`
//! must see `k` rows of genuine history before the rows it actually scores
//! (a one-step difference needs the previous row to produce a correct first
//! value at the start of every out-of-sample batch). The memory manager
//! prepends stored trailing rows that do not overlap the incoming index and
//! re-trims the store after every fit/update — it never lets a node see
//! forward of the true current time.

use crate::frame::{Frame, Series};
use crate::pipeline::Node;

/// Trailing rows a leaf last saw, bounded to its declared `memory_size`.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    pub x: Frame,
    pub y: Option<Series>,
    pub weights: Option<Series>,
}

/// A batch with stored history prepended. `prefix_rows` counts the prepended
/// rows so callers can slice outputs back to the true batch.
#[derive(Debug, Clone)]
pub struct WithMemory {
    pub x: Frame,
    pub y: Option<Series>,
    pub weights: Option<Series>,
    pub prefix_rows: usize,
}

/// Prepend stored history to an incoming batch. Stored rows whose labels
/// overlap the incoming index are dropped, so an already-extended window is
/// not extended twice.
pub fn attach_memory(
    memory: Option<&Memory>,
    memory_size: Option<usize>,
    x: &Frame,
    y: Option<&Series>,
    weights: Option<&Series>,
) -> WithMemory {
    let passthrough = WithMemory {
        x: x.clone(),
        y: y.cloned(),
        weights: weights.cloned(),
        prefix_rows: 0,
    };
    let (Some(memory), Some(size)) = (memory, memory_size) else {
        return passthrough;
    };
    let Some(&first_label) = x.index().first() else {
        return passthrough;
    };

    // Rows strictly before the incoming batch.
    let cutoff = memory
        .x
        .index()
        .iter()
        .position(|&label| label >= first_label)
        .unwrap_or(memory.x.len());
    let keep_from = if size == 0 { 0 } else { cutoff.saturating_sub(size) };
    let prefix_x = memory.x.slice(keep_from, cutoff);
    if prefix_x.is_empty() {
        return passthrough;
    }
    let prefix_rows = prefix_x.len();

    let y_out = y.map(|incoming| match &memory.y {
        Some(stored) => stored.slice(keep_from, cutoff).concat(incoming),
        None => prefix_of_nans(incoming, prefix_x.index()).concat(incoming),
    });
    let weights_out = weights.map(|incoming| match &memory.weights {
        Some(stored) => stored.slice(keep_from, cutoff).concat(incoming),
        // Missing stored weights default to unit weight.
        None => Series::new(
            incoming.name(),
            prefix_x.index().to_vec(),
            vec![1.0; prefix_rows],
        )
        .concat(incoming),
    });

    WithMemory {
        x: Frame::concat_rows(&[prefix_x, x.clone()]),
        y: y_out,
        weights: weights_out,
        prefix_rows,
    }
}

fn prefix_of_nans(like: &Series, index: &[i64]) -> Series {
    Series::new(like.name(), index.to_vec(), vec![f64::NAN; index.len()])
}

/// Store the trailing rows of a batch into the leaf's memory slot.
///
/// On an initial fit the batch replaces the store. On updates the previous
/// store and the new batch are concatenated (dropping stored rows the batch
/// re-delivers) and re-trimmed to `memory_size`. Size 0 means "whatever the
/// last batch contained": the incoming batch always replaces the store
/// outright, so the slot stays bounded by the batch size.
pub fn store_memory(
    slot: &mut Option<Memory>,
    memory_size: Option<usize>,
    x: &Frame,
    y: Option<&Series>,
    weights: Option<&Series>,
    in_sample: bool,
) {
    let Some(size) = memory_size else {
        return;
    };
    if x.is_empty() {
        return;
    }

    let (full_x, full_y, full_w) = match (&*slot, in_sample) {
        (Some(previous), false) if size > 0 => {
            let first_label = x.index()[0];
            let cutoff = previous
                .x
                .index()
                .iter()
                .position(|&label| label >= first_label)
                .unwrap_or(previous.x.len());
            let old_x = previous.x.slice(0, cutoff);
            let joined_x = Frame::concat_rows(&[old_x, x.clone()]);
            let joined_y = match (&previous.y, y) {
                (Some(old), Some(new)) => Some(old.slice(0, cutoff).concat(new)),
                (_, new) => new.cloned(),
            };
            let joined_w = match (&previous.weights, weights) {
                (Some(old), Some(new)) => Some(old.slice(0, cutoff).concat(new)),
                (_, new) => new.cloned(),
            };
            (joined_x, joined_y, joined_w)
        }
        _ => (x.clone(), y.cloned(), weights.cloned()),
    };

    let keep = if size == 0 { full_x.len() } else { size };
    *slot = Some(Memory {
        x: full_x.tail(keep),
        y: full_y.map(|s| s.tail(keep)),
        weights: full_w.map(|s| s.tail(keep)),
    });
}

/// The largest declared memory size anywhere in a tree — how far a replay
/// window must be extended backwards for lookback stitching.
pub fn max_memory_size(node: &Node) -> usize {
    match node {
        Node::Transformation(leaf) => leaf
            .transformation
            .properties()
            .memory_size
            .unwrap_or(0),
        Node::Composite(composite) => {
            let primary = composite
                .children_primary()
                .iter()
                .map(max_memory_size)
                .max()
                .unwrap_or(0);
            let secondary = composite
                .children_secondary()
                .map(|children| children.iter().map(max_memory_size).max().unwrap_or(0))
                .unwrap_or(0);
            primary.max(secondary)
        }
        Node::Sequence(children) => children.iter().map(max_memory_size).max().unwrap_or(0),
    }
}

/// Drop any stored memory anywhere in a tree. Used on a leaf's deep copy
/// when the caller wants a pristine clone.
pub fn clear_memory(node: &mut Node) {
    match node {
        Node::Transformation(leaf) => leaf.memory = None,
        Node::Composite(_) => {}
        Node::Sequence(children) => {
            for child in children {
                clear_memory(child);
            }
        }
    }
}
