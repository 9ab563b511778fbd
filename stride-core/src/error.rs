//! Engine error taxonomy.
//!
//! Structural contract violations indicate a malformed pipeline definition,
//! not a transient data condition; they are raised at the point of violation
//! during tree traversal and never retried.

use thiserror::Error;

/// Errors raised while executing a pipeline tree.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("expected a single {group} child result, got {got}")]
    ChildArity { group: &'static str, got: usize },

    #[error("expected predictions from {group} children of {name}, got raw features")]
    ExpectedPredictions { group: &'static str, name: String },

    #[error(
        "artifact length {artifact_rows} does not match result length {result_rows} after {name}"
    )]
    ArtifactLengthMismatch {
        name: String,
        result_rows: usize,
        artifact_rows: usize,
    },

    #[error("result and artifact indices diverged after {name}")]
    IndexMisalignment { name: String },

    #[error("{name} does not support inverse_transform")]
    InverseUnsupported { name: String },

    #[error("{name}: {message}")]
    Transformation { name: String, message: String },

    #[error("cache I/O at {path}: {source}")]
    CacheIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization: {0}")]
    CacheCodec(#[from] serde_json::Error),
}

impl EngineError {
    /// Convenience for leaf implementations reporting a domain failure.
    pub fn transformation(name: &str, message: impl Into<String>) -> Self {
        EngineError::Transformation {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
