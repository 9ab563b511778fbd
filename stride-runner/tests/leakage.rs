//! Property test: out-of-sample predictions never see the future.

use proptest::prelude::*;

use stride_core::splitter::{ExpandingWindowSplitter, Splitter, WindowSize};
use stride_core::testing::seeded_noise;
use stride_core::model::Naive;
use stride_core::{Node, SequentialBackend};
use stride_runner::{backtest, train, TrainMethod};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // A naive forecaster replayed out of sample must predict exactly the
    // previous target at every row, across every fold geometry: the fitted
    // state at a fold boundary ends with the last train-window target, and
    // online replay learns each target only after predicting its row.
    #[test]
    fn naive_backtest_is_the_shifted_target(
        length in 100usize..600,
        window in 20usize..200,
        step in 5usize..100,
        seed in 0u64..50,
    ) {
        let splitter = ExpandingWindowSplitter::new(
            WindowSize::Rows(window),
            WindowSize::Rows(step),
        );
        let folds = splitter.splits(length).unwrap();
        prop_assume!(!folds.is_empty());

        let (x, y) = seeded_noise(length, seed);
        let backend = SequentialBackend::new();
        let trained = train(
            &Node::leaf(Naive::new()),
            &x,
            &y,
            &splitter,
            None,
            TrainMethod::Parallel,
            &backend,
            true,
        )
        .unwrap();
        let predictions = backtest(&trained, &x, &y, &splitter, None, &backend, true).unwrap();

        let out = predictions.column("predictions_naive").unwrap();
        let first_test_row = folds[0].test_window_start;
        prop_assert_eq!(out.len(), length - first_test_row);
        for (row, &value) in out.iter().enumerate() {
            let t = row + first_test_row;
            prop_assert_eq!(value, y.values()[t - 1]);
        }
    }
}
