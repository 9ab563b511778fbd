//! Lagged differencing with inverse reconstruction.
//!
//! `Difference` declares a lookback memory of `lag` rows, so out-of-sample
//! batches get stitched history prepended and their first rows difference
//! against genuine past values instead of coming out NaN.

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

#[derive(Debug, Clone)]
pub struct Difference {
    lag: usize,
    // Trailing `lag` raw rows from the last fit/update, for inversion.
    history: Option<Frame>,
}

impl Difference {
    pub fn new(lag: usize) -> Self {
        assert!(lag >= 1, "difference lag must be at least 1");
        Self { lag, history: None }
    }
}

impl Transformation for Difference {
    fn name(&self) -> &str {
        "difference"
    }

    fn properties(&self) -> TransformProperties {
        TransformProperties {
            requires_past_x: true,
            memory_size: Some(self.lag),
            ..TransformProperties::default()
        }
    }

    fn fit(
        &mut self,
        x: &Frame,
        _y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<(), EngineError> {
        self.history = Some(x.tail(self.lag));
        Ok(())
    }

    fn update(
        &mut self,
        x: &Frame,
        _y: Option<&Series>,
        _sample_weights: Option<&Series>,
    ) -> Result<Option<Artifact>, EngineError> {
        self.history = Some(x.tail(self.lag));
        Ok(None)
    }

    fn transform(&self, x: &Frame, _in_sample: bool) -> Result<(Frame, Option<Artifact>), EngineError> {
        let mut out = Frame::with_index(x.index().to_vec());
        for column in x.columns() {
            let values = (0..column.values.len())
                .map(|row| {
                    if row < self.lag {
                        f64::NAN
                    } else {
                        column.values[row] - column.values[row - self.lag]
                    }
                })
                .collect();
            out.push_column(column.name.clone(), values);
        }
        Ok((out, None))
    }

    /// Undo the differencing by cumulating from the last raw values seen.
    /// Only defined for single-column data.
    fn inverse_transform(&self, series: &Series) -> Result<Series, EngineError> {
        let history = self.history.as_ref().ok_or_else(|| {
            EngineError::transformation(self.name(), "inverse_transform before fit")
        })?;
        let column = history.first_column().ok_or_else(|| {
            EngineError::transformation(self.name(), "no fitted column to invert against")
        })?;
        if history.num_columns() != 1 {
            return Err(EngineError::transformation(
                self.name(),
                "inverse_transform is only defined for single-column data",
            ));
        }
        // Reconstructed levels, seeded with the raw tail.
        let mut levels = column.values.clone();
        let mut out = Vec::with_capacity(series.len());
        for (row, &diff) in series.values().iter().enumerate() {
            let base = levels[row];
            let value = base + diff;
            out.push(value);
            levels.push(value);
        }
        Ok(Series::new(series.name(), series.index().to_vec(), out))
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(self.clone())
    }
}
