//! Walk-forward execution engine for composable, time-ordered data pipelines.
//!
//! A pipeline is a tree of [`Node`]s — leaf transformations, composites that
//! fan out to child pipelines, and sequences that run children in series. The
//! engine walks the tree recursively per fold of a walk-forward split: fit on
//! a train window, update incrementally as later windows arrive, and replay
//! out-of-sample with online leaves still learning row by row. A side-channel
//! [`Artifact`] table travels with the data and always shares its row index.
//!
//! `stride-core` holds the engine itself: the data model, fold splitters, the
//! stage state machine, lookback memory, execution backends, and a small set
//! of concrete leaves and composites. The walk-forward drivers (train,
//! backtest, infer) live in `stride-runner`.

pub mod artifact;
pub mod backend;
pub mod composites;
pub mod engine;
pub mod error;
pub mod frame;
pub mod memory;
pub mod model;
pub mod pipeline;
pub mod splitter;
pub mod stage;
pub mod testing;
pub mod transform;
pub mod trim;

pub use artifact::{Artifact, SAMPLE_WEIGHT_COLUMN};
pub use backend::{Backend, SequentialBackend, ThreadPoolBackend};
pub use engine::{process, ProcessOutput};
pub use error::EngineError;
pub use frame::{is_prediction, Frame, Series};
pub use pipeline::{
    Composite, CompositeProperties, FoldMetadata, Node, TrainedFold, TrainedPipeline,
    TransformMode, TransformProperties, Transformation,
};
pub use splitter::{
    ExpandingWindowSplitter, Fold, SingleWindowSplitter, SlidingWindowSplitter, SplitError,
    Splitter, WindowSize,
};
pub use stage::Stage;
