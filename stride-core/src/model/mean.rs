//! Weighted running mean of the target — the simplest minibatch estimator
//! with a genuine incremental update.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

#[derive(Debug, Clone, Default)]
pub struct RunningMean {
    weighted_sum: f64,
    total_weight: f64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, y: &Series, weights: Option<&Series>) {
        for (row, &value) in y.values().iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            let weight = weights.and_then(|w| w.get(row)).unwrap_or(1.0);
            self.weighted_sum += value * weight;
            self.total_weight += weight;
        }
    }

    fn mean(&self) -> f64 {
        if self.total_weight > 0.0 {
            self.weighted_sum / self.total_weight
        } else {
            f64::NAN
        }
    }
}

impl Transformation for RunningMean {
    fn name(&self) -> &str {
        "running_mean"
    }

    fn properties(&self) -> TransformProperties {
        TransformProperties::default()
    }

    fn fit(
        &mut self,
        _x: &Frame,
        y: Option<&Series>,
        sample_weights: Option<&Series>,
    ) -> Result<(), EngineError> {
        self.weighted_sum = 0.0;
        self.total_weight = 0.0;
        if let Some(y) = y {
            self.accumulate(y, sample_weights);
        }
        Ok(())
    }

    fn update(
        &mut self,
        _x: &Frame,
        y: Option<&Series>,
        sample_weights: Option<&Series>,
    ) -> Result<Option<Artifact>, EngineError> {
        if let Some(y) = y {
            self.accumulate(y, sample_weights);
        }
        Ok(None)
    }

    fn transform(&self, x: &Frame, _in_sample: bool) -> Result<(Frame, Option<Artifact>), EngineError> {
        Ok((
            Frame::single(
                "predictions_running_mean",
                x.index().to_vec(),
                vec![self.mean(); x.len()],
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
    fn weighted_mean() {
        let mut model = RunningMean::new();
        let x = Frame::single("a", vec![0, 1], vec![0.0, 0.0]);
        let y = Series::new("y", vec![0, 1], vec![1.0, 3.0]);
        let w = Series::new("w", vec![0, 1], vec![3.0, 1.0]);
        model.fit(&x, Some(&y), Some(&w)).unwrap();
        let (out, _) = model.transform(&x, false).unwrap();
        assert_eq!(out.column("predictions_running_mean").unwrap()[0], 1.5);
    }

    #[test]
    fn update_shifts_the_mean() {
        let mut model = RunningMean::new();
        let x = Frame::single("a", vec![0, 1], vec![0.0, 0.0]);
        let y = Series::new("y", vec![0, 1], vec![2.0, 2.0]);
        model.fit(&x, Some(&y), None).unwrap();
        model
            .update(&x, Some(&Series::new("y", vec![2, 3], vec![8.0, 8.0])), None)
            .unwrap();
        let (out, _) = model.transform(&x.slice(0, 1), false).unwrap();
        assert_eq!(out.column("predictions_running_mean").unwrap()[0], 5.0);
    }

    #[test]
    fn refit_resets_state() {
        let mut model = RunningMean::new();
        let x = Frame::single("a", vec![0], vec![0.0]);
        model
            .fit(&x, Some(&Series::new("y", vec![0], vec![100.0])), None)
            .unwrap();
        model
            .fit(&x, Some(&Series::new("y", vec![0], vec![2.0])), None)
            .unwrap();
        let (out, _) = model.transform(&x, false).unwrap();
        assert_eq!(out.column("predictions_running_mean").unwrap()[0], 2.0);
    }
}
