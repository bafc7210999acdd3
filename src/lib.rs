//! Core of the water potability predictor.
//!
//! The desktop binary is a thin egui front-end over this library; the
//! feature builder, the inference engine and the verdict formatter all live
//! here so they can be exercised without a window.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod store;

pub use data::model::{Defaults, Feature, FeatureVector, RawInputs};
pub use error::{ArtifactLoadError, ConfigError, InvalidArtifact, PredictError};
pub use pipeline::engine::{Classifier, PredictionResult, Scaler};
pub use pipeline::verdict::Verdict;
pub use store::{ArtifactPaths, ArtifactStore, Outcome};
