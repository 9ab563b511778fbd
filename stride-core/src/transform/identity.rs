//! The no-op transformation. Useful as a pipeline placeholder and as the
//! smallest possible leaf in tests.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Identity {
    pub fn new() -> Self {
        Self
    }
}

impl Transformation for Identity {
    fn name(&self) -> &str {
        "identity"
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
        Ok((x.clone(), None))
    }

    fn inverse_transform(&self, series: &Series) -> Result<Series, EngineError> {
        Ok(series.clone())
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(*self)
    }
}
