//! Inference over explicitly exported model parameters.
//!
//! Fitted scalers and classifiers are stored as plain numeric arrays in JSON
//! and evaluated here directly:
//!
//! - scalers: standardization, min-max, identity
//! - classifiers: logistic regression, symmetric ("oblivious") boosted
//!   trees as produced by CatBoost-style trainers, and classic boosted
//!   regression trees stored as parallel node arrays
//!
//! Every boosted variant sums a raw log-odds score and maps it through the
//! sigmoid, so all of them expose the same `[P(0), P(1)]` output.

use serde::{Deserialize, Serialize};

use crate::data::model::FeatureVector;
use crate::error::{ArtifactKind, InvalidArtifact, PredictError};

const DEFAULT_THRESHOLD: f64 = 0.5;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

// ---------------------------------------------------------------------------
// Scaler
// ---------------------------------------------------------------------------

/// A fitted per-column transform applied before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`. A zero scale is treated as 1.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`.
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    /// Pass-through for models trained on raw values.
    Identity { n_features: usize },
}

impl Scaler {
    /// Number of columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
            Scaler::Identity { n_features } => *n_features,
        }
    }

    /// Check that the parameter arrays agree with each other.
    pub fn validate(&self) -> Result<(), InvalidArtifact> {
        let (a, b) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
            Scaler::Identity { .. } => return Ok(()),
        };
        if a.len() != b.len() {
            return Err(InvalidArtifact::new(
                ArtifactKind::Scaler,
                format!("parameter arrays disagree in length ({} vs {})", a.len(), b.len()),
            ));
        }
        if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
            return Err(InvalidArtifact::new(
                ArtifactKind::Scaler,
                "parameters contain non-finite values",
            ));
        }
        Ok(())
    }

    /// Apply the transform to a vector of exactly `n_features()` columns.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        self.validate()?;
        if x.len() != self.n_features() {
            return Err(PredictError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.len(),
            });
        }
        let out = match self {
            Scaler::Standard { mean, scale } => x
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(&xi, (&m, &s))| {
                    let s = if s == 0.0 { 1.0 } else { s };
                    (xi - m) / s
                })
                .collect(),
            Scaler::MinMax { min, scale } => x
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(&xi, (&m, &s))| xi * s + m)
                .collect(),
            Scaler::Identity { .. } => x.to_vec(),
        };
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tree building blocks
// ---------------------------------------------------------------------------

/// One split of a symmetric tree: go "right" when `x[feature] > border`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObliviousSplit {
    pub feature: usize,
    pub border: f64,
}

/// A symmetric tree: every level uses the same split, so the leaf index is
/// the bit pattern of split outcomes (bit `i` ⇔ split `i`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObliviousTree {
    pub splits: Vec<ObliviousSplit>,
    /// `2^depth` leaf values.
    pub leaf_values: Vec<f64>,
}

impl ObliviousTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let depth = self.splits.len();
        if depth >= usize::BITS as usize || self.leaf_values.len() != 1usize << depth {
            return Err(format!(
                "oblivious tree of depth {depth} has {} leaves",
                self.leaf_values.len()
            ));
        }
        if let Some(split) = self.splits.iter().find(|s| s.feature >= n_features) {
            return Err(format!(
                "split on feature {} but model has {n_features} features",
                split.feature
            ));
        }
        Ok(())
    }

    fn leaf(&self, x: &[f64]) -> f64 {
        let index = self
            .splits
            .iter()
            .enumerate()
            .fold(0usize, |acc, (bit, split)| {
                if x[split.feature] > split.border {
                    acc | (1 << bit)
                } else {
                    acc
                }
            });
        self.leaf_values[index]
    }
}

/// Node of a regression tree. `feature < 0` marks a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default = "leaf_child")]
    pub left: i32,
    #[serde(default = "leaf_child")]
    pub right: i32,
    #[serde(default)]
    pub value: f64,
}

fn leaf_child() -> i32 {
    -1
}

/// Regression tree; samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("regression tree has no nodes".into());
        }
        let n = self.nodes.len() as i32;
        for (i, node) in self.nodes.iter().enumerate() {
            if node.feature < 0 {
                continue;
            }
            if node.feature as usize >= n_features {
                return Err(format!(
                    "node {i} splits on feature {} but model has {n_features} features",
                    node.feature
                ));
            }
            // Children must point forward, which also rules out cycles.
            let (me, l, r) = (i as i32, node.left, node.right);
            if l <= me || l >= n || r <= me || r >= n {
                return Err(format!("node {i} has invalid children ({l}, {r})"));
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.feature < 0 {
                return node.value;
            }
            idx = if x[node.feature as usize] <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// A fitted binary classifier producing `P(class = 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    ObliviousTrees {
        n_features: usize,
        trees: Vec<ObliviousTree>,
        #[serde(default)]
        bias: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    TreeEnsemble {
        n_features: usize,
        trees: Vec<RegressionTree>,
        #[serde(default)]
        initial_prediction: f64,
        #[serde(default = "unit_scale")]
        learning_rate: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
}

fn unit_scale() -> f64 {
    1.0
}

/// Label plus class probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub label: u8,
    pub probabilities: [f64; 2],
}

impl Classifier {
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Logistic { coefficients, .. } => coefficients.len(),
            Classifier::ObliviousTrees { n_features, .. }
            | Classifier::TreeEnsemble { n_features, .. } => *n_features,
        }
    }

    fn threshold(&self) -> f64 {
        match self {
            Classifier::Logistic { threshold, .. }
            | Classifier::ObliviousTrees { threshold, .. }
            | Classifier::TreeEnsemble { threshold, .. } => *threshold,
        }
    }

    /// Structural checks; a classifier that passes cannot index out of
    /// bounds or loop while scoring a vector of `n_features()` columns.
    pub fn validate(&self) -> Result<(), InvalidArtifact> {
        self.check_structure()
            .map_err(|reason| InvalidArtifact::new(ArtifactKind::Model, reason))
    }

    fn check_structure(&self) -> Result<(), String> {
        let threshold = self.threshold();
        if !(0.0..=1.0).contains(&threshold) {
            return Err(format!("threshold {threshold} is outside [0, 1]"));
        }
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
                ..
            } => {
                if coefficients.iter().chain([intercept]).any(|v| !v.is_finite()) {
                    return Err("logistic parameters contain non-finite values".into());
                }
            }
            Classifier::ObliviousTrees {
                n_features, trees, ..
            } => {
                if trees.is_empty() {
                    return Err("empty tree ensemble".into());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features)
                        .map_err(|e| format!("tree {i}: {e}"))?;
                }
            }
            Classifier::TreeEnsemble {
                n_features, trees, ..
            } => {
                if trees.is_empty() {
                    return Err("empty tree ensemble".into());
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features)
                        .map_err(|e| format!("tree {i}: {e}"))?;
                }
            }
        }
        Ok(())
    }

    /// Raw log-odds for class 1.
    fn raw_score(&self, x: &[f64]) -> f64 {
        match self {
            Classifier::Logistic {
                coefficients,
                intercept,
                ..
            } => intercept + coefficients.iter().zip(x).map(|(c, v)| c * v).sum::<f64>(),
            Classifier::ObliviousTrees {
                trees, bias, scale, ..
            } => bias + scale * trees.iter().map(|t| t.leaf(x)).sum::<f64>(),
            Classifier::TreeEnsemble {
                trees,
                initial_prediction,
                learning_rate,
                ..
            } => {
                initial_prediction
                    + learning_rate * trees.iter().map(|t| t.predict(x)).sum::<f64>()
            }
        }
    }

    /// Score a scaled vector.
    pub fn classify(&self, x: &[f64]) -> Result<ClassScores, PredictError> {
        self.validate()?;
        if x.len() != self.n_features() {
            return Err(PredictError::inference(format!(
                "classifier expects {} features, got {}",
                self.n_features(),
                x.len()
            )));
        }
        if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::inference(format!(
                "scaled feature {pos} is not finite"
            )));
        }
        let p = sigmoid(self.raw_score(x));
        if !p.is_finite() {
            return Err(PredictError::inference("classifier produced a non-finite score"));
        }
        Ok(ClassScores {
            label: u8::from(p >= self.threshold()),
            probabilities: [1.0 - p, p],
        })
    }
}

// ---------------------------------------------------------------------------
// Engine entry-point
// ---------------------------------------------------------------------------

/// Outcome of one classifier call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// 0 = not potable, 1 = potable.
    pub label: u8,
    /// P(class = 1).
    pub probability: f64,
}

/// Scale the vector and classify it.
pub fn predict(
    vector: &FeatureVector,
    scaler: &Scaler,
    classifier: &Classifier,
) -> Result<PredictionResult, PredictError> {
    let scaled = scale(vector, scaler)?;
    classify(&scaled, classifier)
}

/// Classify an already-scaled vector, keeping `P(class = 1)`.
pub fn classify(scaled: &[f64], classifier: &Classifier) -> Result<PredictionResult, PredictError> {
    let scores = classifier.classify(scaled)?;
    Ok(PredictionResult {
        label: scores.label,
        probability: scores.probabilities[1],
    })
}

/// Scale the vector after checking it matches the scaler's width.
pub fn scale(vector: &FeatureVector, scaler: &Scaler) -> Result<Vec<f64>, PredictError> {
    if vector.len() != scaler.n_features() {
        return Err(PredictError::DimensionMismatch {
            expected: scaler.n_features(),
            actual: vector.len(),
        });
    }
    scaler.transform(vector.as_slice())
}
