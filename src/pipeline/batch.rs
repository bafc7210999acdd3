use crate::data::model::Sample;
use crate::error::PredictError;
use crate::store::{ArtifactStore, Outcome};

// ---------------------------------------------------------------------------
// Batch scoring
// ---------------------------------------------------------------------------

/// Result of predicting one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    pub row: usize,
    pub expected: Option<u8>,
    pub outcome: Result<Outcome, PredictError>,
}

impl BatchRow {
    /// `Some(true)` when a labelled row was predicted correctly.
    pub fn is_correct(&self) -> Option<bool> {
        let expected = self.expected?;
        let outcome = self.outcome.as_ref().ok()?;
        Some(outcome.result.label == expected)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub rows: Vec<BatchRow>,
}

/// Aggregate counts over a [`BatchReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub potable: usize,
    /// Successful rows that carried a known label.
    pub labelled: usize,
    pub correct: usize,
}

impl BatchSummary {
    /// Fraction of labelled rows predicted correctly, if any were labelled.
    pub fn accuracy(&self) -> Option<f64> {
        (self.labelled > 0).then(|| self.correct as f64 / self.labelled as f64)
    }
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        let mut s = BatchSummary {
            total: self.rows.len(),
            ..Default::default()
        };
        for row in &self.rows {
            match &row.outcome {
                Ok(outcome) => {
                    s.succeeded += 1;
                    if outcome.verdict.is_potable {
                        s.potable += 1;
                    }
                }
                Err(_) => s.failed += 1,
            }
            if let Some(correct) = row.is_correct() {
                s.labelled += 1;
                if correct {
                    s.correct += 1;
                }
            }
        }
        s
    }
}

/// Predict every sample independently. A failing row is recorded and the
/// rest of the batch still runs.
pub fn run_batch(store: &ArtifactStore, samples: &[Sample]) -> BatchReport {
    let rows: Vec<BatchRow> = samples
        .iter()
        .map(|sample| {
            let outcome = store.predict(&sample.inputs);
            if let Err(e) = &outcome {
                log::warn!("Row {}: {e}", sample.row);
            }
            BatchRow {
                row: sample.row,
                expected: sample.expected,
                outcome,
            }
        })
        .collect();

    let report = BatchReport { rows };
    let summary = report.summary();
    log::info!(
        "Scored {} samples: {} ok, {} failed, {} potable",
        summary.total,
        summary.succeeded,
        summary.failed,
        summary.potable
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Feature, RawInputs};
    use crate::pipeline::engine::{Classifier, Scaler};

    /// Potable iff Turbidity < 4 (raw score 4 - turbidity).
    fn store() -> ArtifactStore {
        let mut coefficients = vec![0.0; 9];
        coefficients[Feature::Turbidity.index()] = -1.0;
        ArtifactStore::new(
            Classifier::Logistic {
                coefficients,
                intercept: 4.0,
                threshold: 0.5,
            },
            Scaler::Identity { n_features: 9 },
            [(Feature::Sulfate, 333.0)].into_iter().collect(),
        )
        .unwrap()
    }

    fn sample(row: usize, turbidity: Option<f64>, sulfate: Option<f64>, expected: Option<u8>) -> Sample {
        let mut inputs = RawInputs::new();
        for f in Feature::ALL {
            inputs.set(f, Some(1.0));
        }
        inputs.set(Feature::Turbidity, turbidity);
        inputs.set(Feature::Sulfate, sulfate);
        Sample {
            row,
            inputs,
            expected,
        }
    }

    #[test]
    fn empty_cells_use_defaults_and_failures_stay_local() {
        let samples = vec![
            sample(1, Some(2.0), None, Some(1)),
            sample(2, None, Some(300.0), Some(0)),
            sample(3, Some(6.0), Some(300.0), Some(1)),
        ];
        let report = run_batch(&store(), &samples);

        assert_eq!(report.rows.len(), 3);
        let first = report.rows[0].outcome.as_ref().unwrap();
        assert_eq!(first.vector.get(Feature::Sulfate), 333.0);
        assert!(first.verdict.is_potable);

        assert_eq!(
            report.rows[1].outcome,
            Err(PredictError::MissingFeature {
                field: Feature::Turbidity
            })
        );
        assert!(report.rows[2].outcome.is_ok());
    }

    #[test]
    fn summary_counts_and_accuracy() {
        let samples = vec![
            sample(1, Some(2.0), Some(300.0), Some(1)), // potable, correct
            sample(2, Some(6.0), Some(300.0), Some(1)), // not potable, wrong
            sample(3, Some(1.0), Some(300.0), None),    // potable, unlabelled
            sample(4, None, Some(300.0), Some(0)),      // fails
        ];
        let summary = run_batch(&store(), &samples).summary();

        assert_eq!(
            summary,
            BatchSummary {
                total: 4,
                succeeded: 3,
                failed: 1,
                potable: 2,
                labelled: 2,
                correct: 1,
            }
        );
        assert_eq!(summary.accuracy(), Some(0.5));
    }

    #[test]
    fn accuracy_is_none_without_labels() {
        let samples = vec![sample(1, Some(2.0), None, None)];
        assert_eq!(run_batch(&store(), &samples).summary().accuracy(), None);
    }
}
