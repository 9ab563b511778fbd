//! The naive forecaster: predict the last target it has learned from.
//!
//! An online leaf, so during updates and backtest replay the engine feeds it
//! row-by-row with predict-then-learn ordering. Its prediction for row `t`
//! therefore never depends on the target at `t` or later.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformMode, TransformProperties, Transformation};

#[derive(Debug, Clone, Default)]
pub struct Naive {
    last_target: Option<f64>,
}

impl Naive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transformation for Naive {
    fn name(&self) -> &str {
        "naive"
    }

    fn properties(&self) -> TransformProperties {
        TransformProperties {
            mode: TransformMode::Online,
            ..TransformProperties::default()
        }
    }

    fn fit(
        &mut self,
        _x: &Frame,
        y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<(), EngineError> {
        if let Some(y) = y {
            if let Some(last) = y.last() {
                self.last_target = Some(last);
            }
        }
        Ok(())
    }

    fn update(
        &mut self,
        _x: &Frame,
        y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<Option<Artifact>, EngineError> {
        if let Some(y) = y {
            if let Some(last) = y.last() {
                if !last.is_nan() {
                    self.last_target = Some(last);
                }
            }
        }
        Ok(None)
    }

    fn transform(&self, x: &Frame, _in_sample: bool) -> Result<(Frame, Option<Artifact>), EngineError> {
        let prediction = self.last_target.unwrap_or(f64::NAN);
        Ok((
            Frame::single(
                "predictions_naive",
                x.index().to_vec(),
                vec![prediction; x.len()],
            ),
            None,
        ))
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_then_learns() {
        let mut model = Naive::new();
        let x = Frame::single("a", vec![0], vec![0.0]);
        let y0 = Series::new("y", vec![0], vec![5.0]);

        // Before any learning the prediction is NaN.
        let (out, _) = model.transform(&x, false).unwrap();
        assert!(out.column("predictions_naive").unwrap()[0].is_nan());

        model.update(&x, Some(&y0), None).unwrap();
        let (out, _) = model.transform(&x, false).unwrap();
        assert_eq!(out.column("predictions_naive").unwrap()[0], 5.0);
    }

    #[test]
    fn nan_target_does_not_learn() {
        let mut model = Naive::new();
        let x = Frame::single("a", vec![0], vec![0.0]);
        model
            .update(&x, Some(&Series::new("y", vec![0], vec![3.0])), None)
            .unwrap();
        model
            .update(&x, Some(&Series::new("y", vec![1], vec![f64::NAN])), None)
            .unwrap();
        let (out, _) = model.transform(&x, false).unwrap();
        assert_eq!(out.column("predictions_naive").unwrap()[0], 3.0);
    }
}
