//! Error types for the transform worker.
//!
//! [`WorkerError`] is what a failed invocation surfaces to the runtime. Store
//! and transformer implementations report [`StoreError`] and
//! [`TransformError`], which the worker wraps with the step that failed.
//! [`CleanupError`] is only ever logged.

use std::path::PathBuf;

/// Invalid worker configuration, detected at load time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A prefix is empty, so every key would fall under it.
    #[error("{name} must not be empty")]
    EmptyPrefix {
        /// Configuration name of the prefix.
        name: &'static str,
    },

    /// One prefix is a prefix of the other, so results could re-trigger the worker.
    #[error(
        "source prefix {source_prefix:?} and destination prefix {destination_prefix:?} overlap"
    )]
    OverlappingPrefixes {
        /// Configured source prefix.
        source_prefix: String,
        /// Configured destination prefix.
        destination_prefix: String,
    },

    /// A value could not be parsed or is out of range.
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue {
        /// Configuration name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Object store failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
    },

    /// The store could not be reached or rejected the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Transformation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The input is not an image in a supported format, or is corrupt.
    #[error("unsupported or corrupt image: {0}")]
    Decode(String),

    /// The input exceeds the pixel limit.
    #[error("image resolution {width}x{height} exceeds the limit of {max_pixels} pixels")]
    TooLarge {
        /// Input width.
        width: u32,
        /// Input height.
        height: u32,
        /// Configured limit.
        max_pixels: u64,
    },

    /// The result could not be encoded.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The transformation task panicked or was cancelled.
    #[error("transformation aborted: {0}")]
    Aborted(String),
}

/// Failure of one invocation.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The source object could not be read.
    #[error("failed to fetch {bucket}/{key}: {source}")]
    Fetch {
        /// Source bucket.
        bucket: String,
        /// Source key.
        key: String,
        /// Store error.
        source: StoreError,
    },

    /// The source object could not be transformed.
    #[error("failed to transform {key}: {source}")]
    Transform {
        /// Source key.
        key: String,
        /// Transformer error.
        source: TransformError,
    },

    /// The result could not be written.
    #[error("failed to upload {bucket}/{key}: {source}")]
    Upload {
        /// Destination bucket.
        bucket: String,
        /// Destination key.
        key: String,
        /// Store error.
        source: StoreError,
    },

    /// Local scratch space could not be created, written or read.
    #[error("scratch space error at {}: {source}", .path.display())]
    Scratch {
        /// Path being accessed.
        path: PathBuf,
        /// I/O error.
        source: std::io::Error,
    },

    /// The destination key falls under the source prefix.
    #[error("refusing to write {key} under the source prefix")]
    LoopDetected {
        /// The rejected destination key.
        key: String,
    },
}

impl WorkerError {
    /// Short, stable name of the failing step, for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Transform { .. } => "transform",
            Self::Upload { .. } => "upload",
            Self::Scratch { .. } => "scratch",
            Self::LoopDetected { .. } => "loop_detected",
        }
    }
}

/// Scratch space could not be removed after an invocation.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove scratch directory {}: {source}", .path.display())]
pub struct CleanupError {
    /// Directory that was left behind.
    pub path: PathBuf,
    /// I/O error.
    pub source: std::io::Error,
}
