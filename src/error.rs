use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a generation step (or the whole run under `all`).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source directory not found: {}", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {artifact}: {source}")]
    Serialize {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("template error: {0}")]
    Template(String),

    #[error("invalid project slug {0:?}: use lowercase letters, digits and single dashes")]
    InvalidSlug(String),

    #[error("refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("step {step} did not complete: {reason}")]
    Aborted { step: String, reason: String },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Per-item failures. These are logged and the item is skipped; the batch
/// keeps going.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required export `{0}`")]
    MissingExport(&'static str),

    #[error("invalid `{field}`: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}
