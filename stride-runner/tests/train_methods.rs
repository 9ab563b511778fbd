//! Train-method and backend coherence.

use stride_core::splitter::{ExpandingWindowSplitter, SlidingWindowSplitter, WindowSize};
use stride_core::testing::seeded_noise;
use stride_core::model::RunningMean;
use stride_core::{Backend, Node, SequentialBackend, ThreadPoolBackend};
use stride_runner::{backtest, train, TrainError, TrainMethod};

fn splitter() -> ExpandingWindowSplitter {
    ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200))
}

fn run(method: TrainMethod, backend: &dyn Backend) -> stride_core::Frame {
    let (x, y) = seeded_noise(1000, 3);
    let trained = train(
        &Node::leaf(RunningMean::new()),
        &x,
        &y,
        &splitter(),
        None,
        method,
        backend,
        true,
    )
    .unwrap();
    backtest(&trained, &x, &y, &splitter(), None, backend, true).unwrap()
}

#[test]
fn sequential_updates_match_parallel_refits_for_linear_state() {
    // A running mean accumulates linearly, so refitting on the grown train
    // window and updating with the newly arrived rows land on the same state.
    let backend = SequentialBackend::new();
    let parallel = run(TrainMethod::Parallel, &backend);
    let sequential = run(TrainMethod::Sequential, &backend);
    let p = parallel.column("predictions_running_mean").unwrap();
    let s = sequential.column("predictions_running_mean").unwrap();
    for (row, (&a, &b)) in p.iter().zip(s).enumerate() {
        assert!((a - b).abs() < 1e-12, "row {row}: {a} != {b}");
    }
}

#[test]
fn thread_pool_matches_the_reference_backend() {
    let sequential = run(TrainMethod::Parallel, &SequentialBackend::new());
    let pooled = run(TrainMethod::Parallel, &ThreadPoolBackend::new());
    assert_eq!(sequential, pooled);
}

#[test]
fn parallel_with_search_reuses_the_first_fit() {
    let (x, y) = seeded_noise(1000, 3);
    let backend = SequentialBackend::new();
    let trained = train(
        &Node::leaf(RunningMean::new()),
        &x,
        &y,
        &splitter(),
        None,
        TrainMethod::ParallelWithSearch,
        &backend,
        true,
    )
    .unwrap();
    assert_eq!(trained.model_indices(), vec![400, 600, 800]);
    let predictions = backtest(&trained, &x, &y, &splitter(), None, &backend, true).unwrap();
    assert_eq!(predictions.len(), 600);
}

#[test]
fn sliding_windows_reject_stateful_train_methods() {
    let (x, y) = seeded_noise(1000, 3);
    let sliding = SlidingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200));
    let backend = SequentialBackend::new();
    let result = train(
        &Node::leaf(RunningMean::new()),
        &x,
        &y,
        &sliding,
        None,
        TrainMethod::Sequential,
        &backend,
        true,
    );
    assert!(matches!(result, Err(TrainError::IncompatibleTrainMethod)));
    // The same splitter is fine with per-fold refits.
    assert!(train(
        &Node::leaf(RunningMean::new()),
        &x,
        &y,
        &sliding,
        None,
        TrainMethod::Parallel,
        &backend,
        true,
    )
    .is_ok());
}

#[test]
fn a_window_larger_than_the_data_yields_no_folds() {
    let (x, y) = seeded_noise(100, 3);
    let oversized = ExpandingWindowSplitter::new(WindowSize::Rows(500), WindowSize::Rows(100));
    let result = train(
        &Node::leaf(RunningMean::new()),
        &x,
        &y,
        &oversized,
        None,
        TrainMethod::Parallel,
        &SequentialBackend::new(),
        true,
    );
    assert!(matches!(result, Err(TrainError::NoFolds { length: 100 })));
}
