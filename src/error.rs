use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using DeepZoomError.
pub type Result<T> = std::result::Result<T, DeepZoomError>;

/// Errors raised while building a pyramid. None of them are recovered from.
#[derive(Error, Debug)]
pub enum DeepZoomError {
    /// Source format is neither jpg nor png.
    #[error("unsupported source format '{0}', only jpg and png are supported")]
    InvalidFormat(String),

    #[error("invalid pyramid level {level}, expected 0..{num_levels}")]
    InvalidLevel { level: u32, num_levels: u32 },

    #[error("invalid tile ({column}, {row}) at level {level}, level has {columns}x{rows} tiles")]
    InvalidTileCoordinate {
        level: u32,
        column: u32,
        row: u32,
        columns: u32,
        rows: u32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Directory or file could not be created or written.
    #[error("file system error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build tile worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl DeepZoomError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileSystem { path: path.into(), source }
    }
}
