use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Feature;

// ---------------------------------------------------------------------------
// Per-request failures
// ---------------------------------------------------------------------------

/// Failure of a single prediction request.
///
/// None of these are fatal: the UI renders them as a message and keeps
/// accepting input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("cannot predict, missing field {field}")]
    MissingFeature { field: Feature },

    #[error("cannot predict, {field} has non-finite value {value}")]
    InvalidValue { field: Feature, value: f64 },

    #[error("unknown input field '{name}'")]
    UnknownFeature { name: String },

    #[error("prediction failed: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("prediction failed: {reason}")]
    Inference { reason: String },
}

impl PredictError {
    pub(crate) fn inference(reason: impl Into<String>) -> Self {
        PredictError::Inference {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Startup failures
// ---------------------------------------------------------------------------

/// Which artifact file failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Model,
    Scaler,
    Defaults,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Defaults => "defaults",
        };
        f.write_str(name)
    }
}

/// An artifact was missing, corrupt or incompatible with the others.
/// The process must not serve predictions after this.
#[derive(Debug, Clone, Error)]
#[error("failed to load {kind} artifact from {}: {reason}", .path.display())]
pub struct ArtifactLoadError {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub reason: String,
}

impl ArtifactLoadError {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Artifact parameters that cannot be evaluated, independent of any file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {reason}")]
pub struct InvalidArtifact {
    pub kind: ArtifactKind,
    pub reason: String,
}

impl InvalidArtifact {
    pub fn new(kind: ArtifactKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl From<InvalidArtifact> for PredictError {
    fn from(err: InvalidArtifact) -> Self {
        PredictError::inference(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Configuration failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be true or false, got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
}
