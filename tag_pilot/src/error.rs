//! Error types for the steering core.
//!
//! The decision engine itself never fails; everything here belongs to the
//! boundaries around it: frame ingestion, the detector seam, the shared store
//! and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning raw bytes into a frame the engine can use.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    #[error("frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
}

/// Failures reported by a marker detector backend.
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("detector backend failed: {0}")]
    Backend(String),

    #[error("detector lock poisoned")]
    Poisoned,
}

/// Failures of the backing medium of the last-command store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store record at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store record is still missing after initialization")]
    Missing,

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tolerance must be a finite value >= 0, got {0}")]
    InvalidTolerance(f64),

    #[error("unknown tag family '{0}' (expected 36h11, 25h9, 16h5 or 36h10)")]
    UnknownTagFamily(String),
}

/// Everything a caller of the steering pipeline can be told went wrong.
///
/// `MissingInput` and `DecodeFailure` are always surfaced to the caller and
/// never folded into a `searching` result.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no image supplied")]
    MissingInput,

    #[error("image could not be decoded")]
    DecodeFailure(#[source] FrameError),

    #[error("marker detection failed")]
    Detection(#[source] DetectorError),

    #[error("last-command store unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl From<FrameError> for SubmitError {
    fn from(err: FrameError) -> Self {
        SubmitError::DecodeFailure(err)
    }
}

impl From<DetectorError> for SubmitError {
    fn from(err: DetectorError) -> Self {
        SubmitError::Detection(err)
    }
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        SubmitError::StoreUnavailable(err)
    }
}
