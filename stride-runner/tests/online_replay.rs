//! Predict-then-learn ordering for online models during backtests.

use stride_core::splitter::{ExpandingWindowSplitter, WindowSize};
use stride_core::testing::seeded_noise;
use stride_core::model::Naive;
use stride_core::{Node, SequentialBackend, Series};
use stride_runner::{backtest, train, TrainMethod};

fn run_naive(y: &Series) -> stride_core::Frame {
    let x = stride_core::Frame::single("a", y.index().to_vec(), vec![0.0; y.len()]);
    let splitter = ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200));
    let backend = SequentialBackend::new();
    let trained = train(
        &Node::leaf(Naive::new()),
        &x,
        y,
        &splitter,
        None,
        TrainMethod::Parallel,
        &backend,
        true,
    )
    .unwrap();
    backtest(&trained, &x, y, &splitter, None, &backend, true).unwrap()
}

#[test]
fn naive_predicts_the_previous_target_everywhere() {
    let (_, y) = seeded_noise(1000, 21);
    let predictions = run_naive(&y);
    let out = predictions.column("predictions_naive").unwrap();
    // Row t was predicted before the model saw y[t]: it equals y[t - 1],
    // including the first row of every fold.
    for (row, &value) in out.iter().enumerate() {
        let t = row + 400;
        assert_eq!(value, y.values()[t - 1], "row {t}");
    }
}

#[test]
fn predictions_are_invariant_to_future_targets() {
    let (_, y) = seeded_noise(1000, 22);
    let baseline = run_naive(&y);

    // Reverse the target values after row 900. All train windows end at 800
    // or earlier, so training is untouched; replay up to row 901 sees only
    // unchanged targets.
    let mut values = y.values().to_vec();
    values[901..].reverse();
    let permuted = Series::new("y", y.index().to_vec(), values);
    let shuffled = run_naive(&permuted);

    // Predictions for rows 400..=901 are byte-identical.
    assert_eq!(baseline.slice(0, 502), shuffled.slice(0, 502));
    // And the permutation did change something later on.
    assert_ne!(baseline, shuffled);
}
