//! Walk-forward fold splitting.
//!
//! A splitter is a pure, deterministic function from dataset length to an
//! ordered list of fold descriptors. All window boundaries are half-open row
//! positions. The no-leakage invariant holds for every generated fold:
//! `test_window_start >= train_window_end`, and with an embargo of `e` rows,
//! `train_window_end <= test_window_start - e`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One walk-forward fold: train/update/test row ranges into the dataset.
///
/// `model_index` is the stable label a trained snapshot is stored and looked
/// up under (the test window start, so training and backtesting agree on it
/// without sharing state). `update_window` covers the rows that arrived since
/// the previous fold, used by incremental training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    pub order: usize,
    pub model_index: usize,
    pub train_window_start: usize,
    pub train_window_end: usize,
    pub update_window_start: usize,
    pub update_window_end: usize,
    pub test_window_start: usize,
    pub test_window_end: usize,
}

/// Errors from resolving window sizes.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("window fraction {fraction} must be strictly between 0 and 1")]
    InvalidFraction { fraction: f64 },
    #[error("window size must be at least 1 row")]
    ZeroWindow,
    #[error("embargo of {embargo} rows does not fit into a train window of {window} rows")]
    EmbargoTooLarge { embargo: usize, window: usize },
}

/// A window size given either as an absolute row count or as a fraction of
/// the dataset length, resolved at call time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowSize {
    Rows(usize),
    Fraction(f64),
}

impl WindowSize {
    pub fn resolve(self, length: usize) -> Result<usize, SplitError> {
        match self {
            WindowSize::Rows(0) => Err(SplitError::ZeroWindow),
            WindowSize::Rows(rows) => Ok(rows),
            WindowSize::Fraction(fraction) => {
                if fraction <= 0.0 || fraction >= 1.0 {
                    return Err(SplitError::InvalidFraction { fraction });
                }
                let rows = (fraction * length as f64) as usize;
                if rows == 0 {
                    return Err(SplitError::ZeroWindow);
                }
                Ok(rows)
            }
        }
    }
}

/// Generates fold boundaries for a dataset of a given length.
pub trait Splitter: Send + Sync {
    fn splits(&self, length: usize) -> Result<Vec<Fold>, SplitError>;

    /// Whether this splitter is only coherent with per-fold refits. A sliding
    /// window discards old rows, so resuming state across folds would let a
    /// node remember data its train window no longer contains.
    fn requires_parallel_training(&self) -> bool {
        false
    }
}

/// Expanding window: the train start is pinned to the dataset start and the
/// train end advances by `step` each fold, so the training set grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandingWindowSplitter {
    pub initial_train_window: WindowSize,
    pub step: WindowSize,
    pub embargo: usize,
    pub start: usize,
    pub end: Option<usize>,
}

impl ExpandingWindowSplitter {
    pub fn new(initial_train_window: WindowSize, step: WindowSize) -> Self {
        Self {
            initial_train_window,
            step,
            embargo: 0,
            start: 0,
            end: None,
        }
    }

    pub fn with_embargo(mut self, embargo: usize) -> Self {
        self.embargo = embargo;
        self
    }
}

impl Splitter for ExpandingWindowSplitter {
    fn splits(&self, length: usize) -> Result<Vec<Fold>, SplitError> {
        let window = self.initial_train_window.resolve(length)?;
        let step = self.step.resolve(length)?;
        check_embargo(self.embargo, window)?;
        let end = self.end.unwrap_or(length).min(length);
        Ok(walk(self.start + window, end, step)
            .enumerate()
            .map(|(order, index)| Fold {
                order,
                model_index: index,
                train_window_start: self.start,
                train_window_end: index - self.embargo,
                update_window_start: (index - self.embargo).saturating_sub(step).max(self.start),
                update_window_end: index - self.embargo,
                test_window_start: index,
                test_window_end: (index + step).min(end),
            })
            .collect())
    }
}

/// Sliding window: train start and end both advance by `step`, so the
/// training set keeps a constant size and shifts forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlidingWindowSplitter {
    pub train_window: WindowSize,
    pub step: WindowSize,
    pub embargo: usize,
    pub start: usize,
    pub end: Option<usize>,
}

impl SlidingWindowSplitter {
    pub fn new(train_window: WindowSize, step: WindowSize) -> Self {
        Self {
            train_window,
            step,
            embargo: 0,
            start: 0,
            end: None,
        }
    }

    pub fn with_embargo(mut self, embargo: usize) -> Self {
        self.embargo = embargo;
        self
    }
}

impl Splitter for SlidingWindowSplitter {
    fn splits(&self, length: usize) -> Result<Vec<Fold>, SplitError> {
        let window = self.train_window.resolve(length)?;
        let step = self.step.resolve(length)?;
        check_embargo(self.embargo, window)?;
        let end = self.end.unwrap_or(length).min(length);
        Ok(walk(self.start + window, end, step)
            .enumerate()
            .map(|(order, index)| Fold {
                order,
                model_index: index,
                train_window_start: index - window,
                train_window_end: index - self.embargo,
                update_window_start: (index - self.embargo).saturating_sub(step).max(index - window),
                update_window_end: index - self.embargo,
                test_window_start: index,
                test_window_end: (index + step).min(end),
            })
            .collect())
    }

    fn requires_parallel_training(&self) -> bool {
        true
    }
}

/// Single split: everything before the cutoff is train, everything after is
/// test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleWindowSplitter {
    pub train_window: WindowSize,
    pub embargo: usize,
}

impl SingleWindowSplitter {
    pub fn new(train_window: WindowSize) -> Self {
        Self {
            train_window,
            embargo: 0,
        }
    }

    pub fn with_embargo(mut self, embargo: usize) -> Self {
        self.embargo = embargo;
        self
    }
}

impl Splitter for SingleWindowSplitter {
    fn splits(&self, length: usize) -> Result<Vec<Fold>, SplitError> {
        let window = self.train_window.resolve(length)?;
        check_embargo(self.embargo, window)?;
        let train_end = window - self.embargo;
        Ok(vec![Fold {
            order: 0,
            model_index: window,
            train_window_start: 0,
            train_window_end: train_end,
            update_window_start: train_end,
            update_window_end: train_end,
            test_window_start: window,
            test_window_end: length.max(window),
        }])
    }
}

fn check_embargo(embargo: usize, window: usize) -> Result<(), SplitError> {
    if embargo >= window {
        return Err(SplitError::EmbargoTooLarge { embargo, window });
    }
    Ok(())
}

fn walk(from: usize, to: usize, step: usize) -> impl Iterator<Item = usize> {
    (from..to).step_by(step.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn expanding_train_ends_advance_by_step() {
        let splitter =
            ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200));
        let folds = splitter.splits(1000).unwrap();
        let train_ends: Vec<usize> = folds.iter().map(|f| f.train_window_end).collect();
        assert_eq!(train_ends, vec![400, 600, 800]);
        for fold in &folds {
            assert_eq!(fold.train_window_start, 0);
        }
        assert_eq!(folds[0].test_window_start, 400);
        assert_eq!(folds[0].test_window_end, 600);
        assert_eq!(folds.last().unwrap().test_window_end, 1000);
    }

    #[test]
    fn expanding_test_windows_are_contiguous() {
        let splitter =
            ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200));
        let folds = splitter.splits(1000).unwrap();
        for pair in folds.windows(2) {
            assert_eq!(pair[0].test_window_end, pair[1].test_window_start);
        }
    }

    #[test]
    fn sliding_train_size_is_constant() {
        let splitter = SlidingWindowSplitter::new(WindowSize::Rows(300), WindowSize::Rows(100));
        let folds = splitter.splits(1000).unwrap();
        assert!(!folds.is_empty());
        for fold in &folds {
            assert_eq!(fold.train_window_end - fold.train_window_start, 300);
        }
    }

    #[test]
    fn fractional_windows_resolve_against_length() {
        let splitter =
            ExpandingWindowSplitter::new(WindowSize::Fraction(0.4), WindowSize::Fraction(0.2));
        let folds = splitter.splits(1000).unwrap();
        assert_eq!(folds[0].train_window_end, 400);
        assert_eq!(folds[0].test_window_end, 600);
    }

    #[test]
    fn invalid_fraction_rejected() {
        assert!(WindowSize::Fraction(1.5).resolve(100).is_err());
        assert!(WindowSize::Fraction(0.0).resolve(100).is_err());
        assert!(WindowSize::Rows(0).resolve(100).is_err());
    }

    #[test]
    fn window_larger_than_data_yields_no_folds() {
        let splitter =
            ExpandingWindowSplitter::new(WindowSize::Rows(2000), WindowSize::Rows(100));
        assert!(splitter.splits(1000).unwrap().is_empty());
    }

    #[test]
    fn embargo_gaps_train_from_test() {
        let splitter = ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200))
            .with_embargo(10);
        let folds = splitter.splits(1000).unwrap();
        for fold in &folds {
            assert_eq!(fold.train_window_end + 10, fold.test_window_start);
        }
    }

    #[test]
    fn embargo_must_fit_in_window() {
        let splitter = SingleWindowSplitter::new(WindowSize::Rows(5)).with_embargo(5);
        assert!(splitter.splits(100).is_err());
    }

    #[test]
    fn single_window_covers_the_rest() {
        let splitter = SingleWindowSplitter::new(WindowSize::Rows(60));
        let folds = splitter.splits(100).unwrap();
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].train_window_end, 60);
        assert_eq!(folds[0].test_window_start, 60);
        assert_eq!(folds[0].test_window_end, 100);
    }

    #[test]
    fn update_window_is_the_new_rows() {
        let splitter =
            ExpandingWindowSplitter::new(WindowSize::Rows(400), WindowSize::Rows(200));
        let folds = splitter.splits(1000).unwrap();
        assert_eq!(folds[1].update_window_start, 400);
        assert_eq!(folds[1].update_window_end, 600);
        assert_eq!(folds[2].update_window_start, 600);
        assert_eq!(folds[2].update_window_end, 800);
    }

    proptest! {
        #[test]
        fn no_leakage_expanding(
            length in 50usize..3000,
            window in 10usize..500,
            step in 1usize..200,
            embargo in 0usize..9,
        ) {
            let splitter = ExpandingWindowSplitter::new(
                WindowSize::Rows(window),
                WindowSize::Rows(step),
            )
            .with_embargo(embargo);
            if let Ok(folds) = splitter.splits(length) {
                for (order, fold) in folds.iter().enumerate() {
                    prop_assert_eq!(fold.order, order);
                    prop_assert!(fold.train_window_end <= fold.test_window_start - embargo);
                    prop_assert!(fold.test_window_start >= fold.train_window_end);
                    prop_assert!(fold.test_window_end <= length);
                    prop_assert!(fold.update_window_start >= fold.train_window_start);
                    prop_assert!(fold.update_window_end <= fold.train_window_end);
                }
            }
        }

        #[test]
        fn no_leakage_sliding(
            length in 50usize..3000,
            window in 10usize..500,
            step in 1usize..200,
            embargo in 0usize..9,
        ) {
            let splitter = SlidingWindowSplitter::new(
                WindowSize::Rows(window),
                WindowSize::Rows(step),
            )
            .with_embargo(embargo);
            if let Ok(folds) = splitter.splits(length) {
                for fold in &folds {
                    prop_assert!(fold.train_window_end <= fold.test_window_start - embargo);
                    prop_assert!(fold.train_window_start <= fold.train_window_end);
                }
            }
        }
    }
}
