use std::path::PathBuf;
use thiserror::Error;

/// The main error type for leafcoco operations.
///
/// Only fatal conditions end up here. Missing optional inputs and malformed
/// annotation sources are skipped by the jobs themselves and never surface
/// as an error.
#[derive(Debug, Error)]
pub enum LeafcocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to traverse {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Invalid image dimensions in {path}: {message}")]
    ImageDimensionInvalid { path: PathBuf, message: String },

    #[error("Failed to write box CSV to {path}: {source}")]
    BoxCsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
