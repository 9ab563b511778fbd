//! Per-fold on-disk result cache.
//!
//! Wraps one child pipeline. The first run of a given `(fold, target, stage)`
//! writes the child's result and artifacts to the cache directory; later runs
//! load them and skip the child entirely (the child is swapped for `Identity`
//! so the traversal still has a well-formed tree). Backtesting tooling only —
//! cached entries replay fixed windows and are wrong for live data.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::error::EngineError;
use crate::frame::{Frame, Series};
use crate::pipeline::{merge_artifacts, Composite, CompositeProperties, FoldMetadata, Node};
use crate::transform::Identity;

#[derive(Clone)]
pub struct Cache {
    child: Node,
    directory: PathBuf,
    metadata: Option<FoldMetadata>,
}

impl Cache {
    pub fn new(child: Node, directory: impl Into<PathBuf>) -> Self {
        Self {
            child,
            directory: directory.into(),
            metadata: None,
        }
    }

    fn entry_path(&self, kind: &str, fit: bool) -> Option<PathBuf> {
        let metadata = self.metadata.as_ref()?;
        let stage = if fit { "fit" } else { "predict" };
        let key = format!(
            "{kind}:{target}:fold{fold}:{stage}",
            target = metadata.target,
            fold = metadata.fold_index,
        );
        let digest = blake3::hash(key.as_bytes()).to_hex();
        Some(self.directory.join(format!("{digest}.json")))
    }

    fn has_fit_entry(&self) -> bool {
        self.entry_path("result", true)
            .map(|path| path.exists())
            .unwrap_or(false)
    }
}

impl Composite for Cache {
    fn name(&self) -> &str {
        "cache"
    }

    fn properties(&self) -> CompositeProperties {
        CompositeProperties {
            primary_only_single_pipeline: true,
            artifacts_length_should_match: false,
            ..CompositeProperties::default()
        }
    }

    fn children_primary(&self) -> Vec<Node> {
        if self.has_fit_entry() {
            vec![Node::leaf(Identity::new())]
        } else {
            vec![self.child.clone()]
        }
    }

    fn postprocess_result_primary(
        &self,
        results: &[Frame],
        _y: Option<&Series>,
        fit: bool,
    ) -> Result<Frame, EngineError> {
        let fresh = results.first().ok_or(EngineError::ChildArity {
            group: "primary",
            got: 0,
        })?;
        let Some(path) = self.entry_path("result", fit) else {
            return Ok(fresh.clone());
        };
        if path.exists() {
            return read_table(&path);
        }
        write_table(&path, fresh)?;
        Ok(fresh.clone())
    }

    fn postprocess_artifacts_primary(
        &self,
        primary_artifacts: &[Artifact],
        _results: &[Frame],
        _original_artifact: &Artifact,
        fit: bool,
    ) -> Result<Artifact, EngineError> {
        let fresh = merge_artifacts(primary_artifacts);
        let Some(path) = self.entry_path("artifacts", fit) else {
            return Ok(fresh);
        };
        if path.exists() {
            return Ok(Artifact::from_frame(read_table(&path)?));
        }
        write_table(&path, fresh.frame())?;
        Ok(fresh)
    }

    fn set_metadata(&mut self, metadata: &FoldMetadata) {
        self.metadata = Some(metadata.clone());
        self.child.set_metadata(metadata);
    }

    fn clone_with_children(
        &self,
        primary: Vec<Node>,
        _secondary: Option<Vec<Node>>,
    ) -> Box<dyn Composite> {
        // On a cache hit the processed child is the stand-in Identity; keep
        // the real (unfitted) pipeline instead.
        let child = if self.has_fit_entry() {
            self.child.clone()
        } else {
            primary.into_iter().next().unwrap_or_else(|| self.child.clone())
        };
        Box::new(Cache {
            child,
            directory: self.directory.clone(),
            metadata: self.metadata.clone(),
        })
    }

    fn clone_box(&self) -> Box<dyn Composite> {
        Box::new(self.clone())
    }
}

/// JSON-safe table encoding: NaN cells become `null`.
#[derive(Serialize, Deserialize)]
struct CachedTable {
    index: Vec<i64>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl CachedTable {
    fn from_frame(frame: &Frame) -> Self {
        Self {
            index: frame.index().to_vec(),
            columns: frame
                .columns()
                .iter()
                .map(|c| {
                    let values = c
                        .values
                        .iter()
                        .map(|&v| if v.is_nan() { None } else { Some(v) })
                        .collect();
                    (c.name.clone(), values)
                })
                .collect(),
        }
    }

    fn into_frame(self) -> Frame {
        let mut frame = Frame::with_index(self.index);
        for (name, values) in self.columns {
            frame.push_column(name, values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect());
        }
        frame
    }
}

fn read_table(path: &Path) -> Result<Frame, EngineError> {
    let bytes = fs::read(path).map_err(|source| EngineError::CacheIo {
        path: path.display().to_string(),
        source,
    })?;
    let table: CachedTable = serde_json::from_slice(&bytes)?;
    Ok(table.into_frame())
}

fn write_table(path: &Path, frame: &Frame) -> Result<(), EngineError> {
    let io_error = |source| EngineError::CacheIo {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let bytes = serde_json::to_vec(&CachedTable::from_frame(frame))?;
    fs::write(path, bytes).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SequentialBackend;
    use crate::engine::process;
    use crate::model::Constant;
    use crate::stage::Stage;

    fn run(node: Node, x: &Frame) -> Frame {
        let artifact = Artifact::empty_with_index(x.index());
        process(
            node,
            x.clone(),
            None,
            artifact,
            Stage::InitialFit,
            &SequentialBackend::new(),
        )
        .unwrap()
        .result
    }

    fn metadata() -> FoldMetadata {
        FoldMetadata {
            fold_index: 0,
            target: "y".to_string(),
        }
    }

    #[test]
    fn second_run_loads_instead_of_recomputing() {
        let dir = tempfile::tempdir().unwrap();
        let x = Frame::single("a", vec![0, 1], vec![0.0, 0.0]);

        let mut first = Node::composite(Cache::new(Node::leaf(Constant::new(1.0)), dir.path()));
        first.set_metadata(&metadata());
        let fresh = run(first, &x);
        assert_eq!(fresh.column("predictions_constant").unwrap(), &[1.0, 1.0]);

        // Same key, different child: the cached result wins.
        let mut second = Node::composite(Cache::new(Node::leaf(Constant::new(9.0)), dir.path()));
        second.set_metadata(&metadata());
        let cached = run(second, &x);
        assert_eq!(cached.column("predictions_constant").unwrap(), &[1.0, 1.0]);
    }

    #[test]
    fn distinct_folds_use_distinct_entries() {
        let dir = tempfile::tempdir().unwrap();
        let x = Frame::single("a", vec![0], vec![0.0]);

        let mut fold0 = Node::composite(Cache::new(Node::leaf(Constant::new(1.0)), dir.path()));
        fold0.set_metadata(&metadata());
        run(fold0, &x);

        let mut fold1 = Node::composite(Cache::new(Node::leaf(Constant::new(2.0)), dir.path()));
        fold1.set_metadata(&FoldMetadata {
            fold_index: 1,
            target: "y".to_string(),
        });
        let out = run(fold1, &x);
        assert_eq!(out.column("predictions_constant").unwrap(), &[2.0]);
    }

    #[test]
    fn nan_cells_survive_the_codec() {
        let frame = Frame::single("a", vec![0, 1], vec![f64::NAN, 2.0]);
        let table = CachedTable::from_frame(&frame);
        let back = table.into_frame();
        assert!(back.column("a").unwrap()[0].is_nan());
        assert_eq!(back.column("a").unwrap()[1], 2.0);
    }

    #[test]
    fn no_metadata_means_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let node = Node::composite(Cache::new(Node::leaf(Constant::new(4.0)), dir.path()));
        let x = Frame::single("a", vec![0], vec![0.0]);
        let out = run(node, &x);
        assert_eq!(out.column("predictions_constant").unwrap(), &[4.0]);
        // Nothing was written without a fold key.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
