// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameDbError {
    #[error("Unknown dataset: {0}")]
    UnsupportedDataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] heed::Error),

    #[error("Metadata error: {0}")]
    Meta(#[from] serde_pickle::Error),

    #[error("Frame store error: {0}")]
    Store(String),

    #[error("Malformed key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Sequence '{id}' contains no frames")]
    EmptySequence { id: String },

    #[error("Entry '{key}' holds {actual} bytes, key declares {expected}")]
    ShapeMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Entry '{key}' listed in metadata but missing from store")]
    MissingEntry { key: String },

    #[error("Store holds dataset '{found}', expected '{expected}'")]
    DatasetMismatch { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, FrameDbError>;
