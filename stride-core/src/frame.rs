//! Time-indexed column tables — the engine's data model.
//!
//! A `Frame` is an ordered table of named `f64` columns sharing one strictly
//! increasing `i64` row index (epoch seconds, or plain row labels in tests).
//! A `Series` is a single named column with its own copy of the index.
//!
//! Frames are value types: slicing and reindexing produce new frames, so fold
//! windows and child views never alias each other's storage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single named column paired with the frame's row index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    name: String,
    index: Vec<i64>,
    values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, index: Vec<i64>, values: Vec<f64>) -> Self {
        assert_eq!(index.len(), values.len(), "index/value length mismatch");
        Self {
            name: name.into(),
            index,
            values,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<f64> {
        self.values.get(row).copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Slice to `[start, end)`, clamped to the series length.
    pub fn slice(&self, start: usize, end: usize) -> Series {
        let end = end.min(self.len());
        let start = start.min(end);
        Series::new(
            self.name.clone(),
            self.index[start..end].to_vec(),
            self.values[start..end].to_vec(),
        )
    }

    /// The trailing `n` rows.
    pub fn tail(&self, n: usize) -> Series {
        self.slice(self.len().saturating_sub(n), self.len())
    }

    /// Row-wise concatenation. All parts keep the same name as `self`.
    pub fn concat(&self, other: &Series) -> Series {
        let mut index = self.index.clone();
        index.extend_from_slice(&other.index);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Series::new(self.name.clone(), index, values)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Series {
        self.name = name.into();
        self
    }
}

/// A named column inside a `Frame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// An ordered, time-indexed table of `f64` columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    index: Vec<i64>,
    columns: Vec<Column>,
}

impl Frame {
    /// A frame with an index and no columns yet.
    pub fn with_index(index: Vec<i64>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn from_columns(index: Vec<i64>, columns: Vec<(String, Vec<f64>)>) -> Self {
        let mut frame = Frame::with_index(index);
        for (name, values) in columns {
            frame.push_column(name, values);
        }
        frame
    }

    pub fn from_series(series: Series) -> Self {
        Frame::from_columns(
            series.index.clone(),
            vec![(series.name.clone(), series.values)],
        )
    }

    /// A single-column frame.
    pub fn single(name: impl Into<String>, index: Vec<i64>, values: Vec<f64>) -> Self {
        Frame::from_columns(index, vec![(name.into(), values)])
    }

    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) {
        assert_eq!(
            values.len(),
            self.index.len(),
            "column length must match index length"
        );
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn first_column(&self) -> Option<&Column> {
        self.columns.first()
    }

    pub fn get(&self, row: usize, name: &str) -> Option<f64> {
        self.column(name).and_then(|v| v.get(row).copied())
    }

    pub fn position_of(&self, label: i64) -> Option<usize> {
        self.index.iter().position(|&l| l == label)
    }

    /// Slice rows to `[start, end)`, clamped to the frame length.
    pub fn slice(&self, start: usize, end: usize) -> Frame {
        let end = end.min(self.len());
        let start = start.min(end);
        Frame {
            index: self.index[start..end].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: c.values[start..end].to_vec(),
                })
                .collect(),
        }
    }

    /// The trailing `n` rows.
    pub fn tail(&self, n: usize) -> Frame {
        self.slice(self.len().saturating_sub(n), self.len())
    }

    /// Row-wise concatenation of same-schema frames, preserving order.
    /// Empty parts are skipped; an empty input produces an empty frame.
    pub fn concat_rows(parts: &[Frame]) -> Frame {
        let mut parts = parts.iter().filter(|p| !p.is_empty());
        let Some(first) = parts.next() else {
            return Frame::default();
        };
        let mut out = first.clone();
        for part in parts {
            assert_eq!(
                out.column_names(),
                part.column_names(),
                "concat_rows requires identical schemas"
            );
            out.index.extend_from_slice(&part.index);
            for (dst, src) in out.columns.iter_mut().zip(part.columns.iter()) {
                dst.values.extend_from_slice(&src.values);
            }
        }
        out
    }

    /// Re-align rows onto `target` labels. Rows present in `self` are copied,
    /// missing labels become NaN rows.
    pub fn reindex(&self, target: &[i64]) -> Frame {
        let positions: HashMap<i64, usize> = self
            .index
            .iter()
            .enumerate()
            .map(|(pos, &label)| (label, pos))
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: target
                    .iter()
                    .map(|label| {
                        positions
                            .get(label)
                            .map(|&pos| c.values[pos])
                            .unwrap_or(f64::NAN)
                    })
                    .collect(),
            })
            .collect();
        Frame {
            index: target.to_vec(),
            columns,
        }
    }

    /// Column-wise merge with an equally indexed frame; on a name collision
    /// the incoming column wins.
    pub fn merge_columns(&self, other: &Frame) -> Frame {
        assert_eq!(self.index, other.index, "merge_columns requires equal indices");
        let mut out = self.clone();
        for col in &other.columns {
            match out.columns.iter_mut().find(|c| c.name == col.name) {
                Some(existing) => existing.values = col.values.clone(),
                None => out.columns.push(col.clone()),
            }
        }
        out
    }

    /// Extract a single-column frame as a `Series`. `None` if the frame does
    /// not have exactly one column.
    pub fn to_series(&self) -> Option<Series> {
        if self.columns.len() != 1 {
            return None;
        }
        let col = &self.columns[0];
        Some(Series::new(
            col.name.clone(),
            self.index.clone(),
            col.values.clone(),
        ))
    }

    pub fn rename_columns(mut self, rename: impl Fn(&str) -> String) -> Frame {
        for col in &mut self.columns {
            col.name = rename(&col.name);
        }
        self
    }
}

/// Whether a frame is recognizable as a model's output rather than raw
/// features: non-empty, and every column is a prediction or probability.
pub fn is_prediction(frame: &Frame) -> bool {
    !frame.columns.is_empty()
        && frame
            .columns
            .iter()
            .all(|c| c.name.starts_with("predictions_") || c.name.starts_with("probabilities_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns(
            vec![0, 1, 2, 3],
            vec![
                ("a".into(), vec![1.0, 2.0, 3.0, 4.0]),
                ("b".into(), vec![10.0, 20.0, 30.0, 40.0]),
            ],
        )
    }

    #[test]
    fn slice_clamps_out_of_bounds() {
        let f = sample();
        let s = f.slice(2, 100);
        assert_eq!(s.len(), 2);
        assert_eq!(s.index(), &[2, 3]);
        assert_eq!(s.column("a").unwrap(), &[3.0, 4.0]);
    }

    #[test]
    fn concat_rows_preserves_order() {
        let f = sample();
        let joined = Frame::concat_rows(&[f.slice(0, 2), f.slice(2, 4)]);
        assert_eq!(joined, sample());
    }

    #[test]
    fn concat_rows_skips_empty_parts() {
        let f = sample();
        let joined = Frame::concat_rows(&[f.slice(0, 0), f.clone(), f.slice(4, 4)]);
        assert_eq!(joined, f);
    }

    #[test]
    fn reindex_fills_missing_with_nan() {
        let f = sample();
        let r = f.reindex(&[1, 2, 9]);
        assert_eq!(r.index(), &[1, 2, 9]);
        let a = r.column("a").unwrap();
        assert_eq!(&a[..2], &[2.0, 3.0]);
        assert!(a[2].is_nan());
    }

    #[test]
    fn merge_columns_last_wins() {
        let f = sample();
        let other = Frame::single("a", vec![0, 1, 2, 3], vec![9.0, 9.0, 9.0, 9.0]);
        let merged = f.merge_columns(&other);
        assert_eq!(merged.column("a").unwrap(), &[9.0; 4]);
        assert_eq!(merged.column("b").unwrap(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn prediction_shape_detection() {
        let raw = sample();
        assert!(!is_prediction(&raw));
        let preds = Frame::single("predictions_naive", vec![0, 1], vec![0.5, 0.5]);
        assert!(is_prediction(&preds));
        let empty = Frame::with_index(vec![0, 1]);
        assert!(!is_prediction(&empty));
    }

    #[test]
    fn series_tail_and_concat() {
        let s = Series::new("y", vec![0, 1, 2], vec![1.0, 2.0, 3.0]);
        let t = s.tail(2);
        assert_eq!(t.index(), &[1, 2]);
        let joined = t.concat(&Series::new("y", vec![3], vec![4.0]));
        assert_eq!(joined.values(), &[2.0, 3.0, 4.0]);
    }
}
