//! Averaging ensemble over independent child pipelines.

use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{Composite, CompositeProperties, FoldMetadata, Node};

/// Runs every child on the same data and averages their prediction columns
/// position-wise. Children must produce the same number of columns; the
/// merged frame takes the first child's column names.
#[derive(Clone)]
pub struct Ensemble {
    children: Vec<Node>,
}

impl Ensemble {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

impl Composite for Ensemble {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn properties(&self) -> CompositeProperties {
        CompositeProperties {
            primary_requires_predictions: true,
            ..CompositeProperties::default()
        }
    }

    fn children_primary(&self) -> Vec<Node> {
        self.children.clone()
    }

    fn postprocess_result_primary(
        &self,
        results: &[Frame],
        _y: Option<&Series>,
        _fit: bool,
    ) -> Result<Frame, EngineError> {
        let first = results.first().ok_or(EngineError::ChildArity {
            group: "primary",
            got: 0,
        })?;
        let width = first.num_columns();
        for result in results {
            if result.num_columns() != width {
                return Err(EngineError::transformation(
                    "ensemble",
                    format!(
                        "children produced {} and {} prediction columns",
                        width,
                        result.num_columns()
                    ),
                ));
            }
        }
        let mut out = Frame::with_index(first.index().to_vec());
        for (position, column) in first.columns().iter().enumerate() {
            let mut sums = vec![0.0; first.len()];
            let mut counts = vec![0usize; first.len()];
            for result in results {
                let values = &result.columns()[position].values;
                for (row, &value) in values.iter().enumerate() {
                    if !value.is_nan() {
                        sums[row] += value;
                        counts[row] += 1;
                    }
                }
            }
            let averaged = sums
                .iter()
                .zip(&counts)
                .map(|(&sum, &count)| if count > 0 { sum / count as f64 } else { f64::NAN })
                .collect();
            out.push_column(column.name.clone(), averaged);
        }
        Ok(out)
    }

    fn set_metadata(&mut self, metadata: &FoldMetadata) {
        for child in &mut self.children {
            child.set_metadata(metadata);
        }
    }

    fn clone_with_children(
        &self,
        primary: Vec<Node>,
        _secondary: Option<Vec<Node>>,
    ) -> Box<dyn Composite> {
        Box::new(Ensemble { children: primary })
    }

    fn clone_box(&self) -> Box<dyn Composite> {
        Box::new(self.clone())
    }
}
