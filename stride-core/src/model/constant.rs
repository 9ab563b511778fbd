//! Predicts one fixed value everywhere. A baseline and a test fixture.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

#[derive(Debug, Clone, Copy)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Transformation for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn properties(&self) -> TransformProperties {
        TransformProperties::default()
    }

    fn fit(
        &mut self,
        _x: &Frame,
        _y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    fn update(
        &mut self,
        _x: &Frame,
        _y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<Option<Artifact>, EngineError> {
        Ok(None)
    }

    fn transform(&self, x: &Frame, _in_sample: bool) -> Result<(Frame, Option<Artifact>), EngineError> {
        Ok((
            Frame::single(
                "predictions_constant",
                x.index().to_vec(),
                vec![self.value; x.len()],
            ),
            None,
        ))
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(*self)
    }
}
