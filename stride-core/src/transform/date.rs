//! Calendar features derived from the epoch-second row index.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{TransformProperties, Transformation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFeature {
    /// Monday = 0 .. Sunday = 6.
    DayOfWeek,
    DayOfMonth,
    Month,
    Hour,
}

impl DateFeature {
    fn column_name(self) -> &'static str {
        match self {
            DateFeature::DayOfWeek => "day_of_week",
            DateFeature::DayOfMonth => "day_of_month",
            DateFeature::Month => "month",
            DateFeature::Hour => "hour",
        }
    }

    fn extract(self, at: DateTime<Utc>) -> f64 {
        match self {
            DateFeature::DayOfWeek => at.weekday().num_days_from_monday() as f64,
            DateFeature::DayOfMonth => at.day() as f64,
            DateFeature::Month => at.month() as f64,
            DateFeature::Hour => at.hour() as f64,
        }
    }
}

/// Appends the requested calendar columns to the incoming table. Stateless.
#[derive(Debug, Clone)]
pub struct DateFeatures {
    features: Vec<DateFeature>,
}

impl DateFeatures {
    pub fn new(features: Vec<DateFeature>) -> Self {
        Self { features }
    }
}

impl Transformation for DateFeatures {
    fn name(&self) -> &str {
        "date_features"
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
        let mut timestamps = Vec::with_capacity(x.len());
        for &label in x.index() {
            let at = DateTime::from_timestamp(label, 0).ok_or_else(|| {
                EngineError::transformation(
                    self.name(),
                    format!("index label {label} is not a valid epoch timestamp"),
                )
            })?;
            timestamps.push(at);
        }
        let mut out = x.clone();
        for feature in &self.features {
            let values = timestamps.iter().map(|&at| feature.extract(at)).collect();
            out.push_column(feature.column_name(), values);
        }
        Ok((out, None))
    }

    fn clone_box(&self) -> Box<dyn Transformation> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_calendar_columns() {
        // 2021-01-04 was a Monday; timestamps are noon on consecutive days.
        let base = 1_609_761_600;
        let index: Vec<i64> = (0..7).map(|d| base + d * 86_400).collect();
        let x = Frame::single("a", index, vec![0.0; 7]);
        let t = DateFeatures::new(vec![DateFeature::DayOfWeek, DateFeature::Hour]);
        let (out, _) = t.transform(&x, false).unwrap();
        assert_eq!(
            out.column("day_of_week").unwrap(),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(out.column("hour").unwrap(), &[12.0; 7]);
        // Original columns are preserved.
        assert!(out.column("a").is_some());
    }
}
