/// Prediction pipeline: raw inputs → feature vector → scores → verdict.
///
/// ```text
///  RawInputs + Defaults
///        │
///        ▼
///   ┌──────────┐
///   │ builder   │  canonical order, defaults, finiteness
///   └──────────┘
///        │ FeatureVector
///        ▼
///   ┌──────────┐
///   │ engine    │  Scaler → Classifier
///   └──────────┘
///        │ PredictionResult
///        ▼
///   ┌──────────┐
///   │ verdict   │  message + confidence
///   └──────────┘
/// ```
///
/// Every stage is a pure function of its inputs; `batch` runs the same
/// chain over many rows.

pub mod batch;
pub mod builder;
pub mod engine;
pub mod verdict;
