use std::path::{Path, PathBuf};

use crate::data::model::{Defaults, FeatureVector, RawInputs};
use crate::error::{ArtifactLoadError, InvalidArtifact, PredictError};
use crate::pipeline::engine::{self, Classifier, PredictionResult, Scaler};
use crate::pipeline::builder;
use crate::pipeline::verdict::{self, Verdict};

pub const MODEL_FILE: &str = "model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const DEFAULTS_FILE: &str = "defaults.json";

// ---------------------------------------------------------------------------
// Artifact locations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub defaults: PathBuf,
}

impl ArtifactPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            scaler: dir.join(SCALER_FILE),
            defaults: dir.join(DEFAULTS_FILE),
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactStore – immutable context shared by every request
// ---------------------------------------------------------------------------

/// Everything a request needs from disk. Built once at startup and shared
/// read-only (typically behind an `Arc`).
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    scaler: Scaler,
    classifier: Classifier,
    defaults: Defaults,
}

/// The per-request products of one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub vector: FeatureVector,
    pub scaled: Vec<f64>,
    pub result: PredictionResult,
    pub verdict: Verdict,
}

impl ArtifactStore {
    /// Assemble a store from already-parsed artifacts, with the same
    /// compatibility checks as [`ArtifactStore::load`].
    pub fn new(
        classifier: Classifier,
        scaler: Scaler,
        defaults: Defaults,
    ) -> Result<Self, InvalidArtifact> {
        crate::data::loader::check_compatible(&classifier, &scaler, &defaults)?;
        Ok(Self {
            scaler,
            classifier,
            defaults,
        })
    }

    /// Read and validate the three artifact files.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactLoadError> {
        crate::data::loader::load_artifacts(paths)
    }

    pub(crate) fn from_parts(classifier: Classifier, scaler: Scaler, defaults: Defaults) -> Self {
        Self {
            scaler,
            classifier,
            defaults,
        }
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Build → scale → classify → format.
    pub fn predict(&self, raw: &RawInputs) -> Result<Outcome, PredictError> {
        let vector = builder::build(raw, &self.defaults)?;
        let scaled = engine::scale(&vector, &self.scaler)?;
        let result = engine::classify(&scaled, &self.classifier)?;
        let verdict = verdict::format(&result);
        log::debug!(
            "predicted label={} p={:.4} for {:?}",
            result.label,
            result.probability,
            vector.as_slice()
        );
        Ok(Outcome {
            vector,
            scaled,
            result,
            verdict,
        })
    }
}
