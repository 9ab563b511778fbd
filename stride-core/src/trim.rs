//! Leading-NaN trimming.
//!
//! Derived features often have a warm-up period of NaN rows at the start of a
//! window. Those rows are removed from `X`, `y`, and the artifact together
//! before fitting, so warm-up values never pollute a fit.

use crate::artifact::Artifact;
use crate::frame::{Frame, Series};

/// First row position at which every `X` column and `y` (when given) are
/// non-NaN. `None` when no such row exists.
pub fn first_valid_row(x: &Frame, y: Option<&Series>) -> Option<usize> {
    (0..x.len()).find(|&row| {
        let x_ok = x.columns().iter().all(|c| !c.values[row].is_nan());
        let y_ok = y.map(|s| !s.values()[row].is_nan()).unwrap_or(true);
        x_ok && y_ok
    })
}

/// Trim leading rows where `X` or `y` contain NaN, keeping all three tables
/// aligned. All-NaN input trims to empty.
pub fn trim_initial_nans(x: &Frame, y: &Series, artifact: &Artifact) -> (Frame, Series, Artifact) {
    // Fast path: nothing to trim.
    if first_row_is_valid(x, Some(y)) {
        return (x.clone(), y.clone(), artifact.clone());
    }
    let start = first_valid_row(x, Some(y)).unwrap_or(x.len());
    (
        x.slice(start, x.len()),
        y.slice(start, y.len()),
        artifact.slice(start, artifact.len()),
    )
}

/// Trim leading rows of a single frame where any column is NaN.
pub fn trim_initial_nans_single(x: &Frame) -> Frame {
    if first_row_is_valid(x, None) {
        return x.clone();
    }
    let start = first_valid_row(x, None).unwrap_or(x.len());
    x.slice(start, x.len())
}

fn first_row_is_valid(x: &Frame, y: Option<&Series>) -> bool {
    if x.is_empty() {
        return true;
    }
    let x_ok = x.columns().iter().all(|c| !c.values[0].is_nan());
    let y_ok = y.map(|s| !s.values()[0].is_nan()).unwrap_or(true);
    x_ok && y_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_warmup_rows() {
        let x = Frame::single("a", vec![0, 1, 2, 3], vec![f64::NAN, f64::NAN, 1.0, 2.0]);
        let y = Series::new("y", vec![0, 1, 2, 3], vec![0.0, 1.0, 2.0, 3.0]);
        let artifact = Artifact::empty_with_index(&[0, 1, 2, 3]);
        let (x2, y2, a2) = trim_initial_nans(&x, &y, &artifact);
        assert_eq!(x2.index(), &[2, 3]);
        assert_eq!(y2.index(), &[2, 3]);
        assert_eq!(a2.index(), &[2, 3]);
    }

    #[test]
    fn nan_target_also_trims() {
        let x = Frame::single("a", vec![0, 1], vec![1.0, 2.0]);
        let y = Series::new("y", vec![0, 1], vec![f64::NAN, 1.0]);
        let artifact = Artifact::empty_with_index(&[0, 1]);
        let (x2, ..) = trim_initial_nans(&x, &y, &artifact);
        assert_eq!(x2.index(), &[1]);
    }

    #[test]
    fn all_nan_trims_to_empty() {
        let x = Frame::single("a", vec![0, 1], vec![f64::NAN, f64::NAN]);
        let trimmed = trim_initial_nans_single(&x);
        assert!(trimmed.is_empty());
    }

    #[test]
    fn clean_input_untouched() {
        let x = Frame::single("a", vec![0, 1], vec![1.0, 2.0]);
        assert_eq!(trim_initial_nans_single(&x), x);
    }

    #[test]
    fn interior_nans_are_kept() {
        let x = Frame::single("a", vec![0, 1, 2], vec![1.0, f64::NAN, 2.0]);
        assert_eq!(trim_initial_nans_single(&x).len(), 3);
    }
}
