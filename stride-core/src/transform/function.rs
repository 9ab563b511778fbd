//! Elementwise function application.

use std::sync::Arc;

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

/// Applies a stateless scalar function to every cell. The function is shared
/// behind an `Arc` so cloned pipeline trees stay cheap.
#[derive(Clone)]
pub struct ApplyFunction {
    name: String,
    function: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl ApplyFunction {
    pub fn new(
        name: impl Into<String>,
        function: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            function: Arc::new(function),
        }
    }
}

impl std::fmt::Debug for ApplyFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApplyFunction({})", self.name)
    }
}

impl Transformation for ApplyFunction {
    fn name(&self) -> &str {
        &self.name
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
        let mut out = Frame::with_index(x.index().to_vec());
        for column in x.columns() {
            let values = column.values.iter().map(|&v| (self.function)(v)).collect();
            out.push_column(column.name.clone(), values);
        }
        Ok((out, None))
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(self.clone())
    }
}
