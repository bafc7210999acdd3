use std::path::{Path, PathBuf};
use std::sync::Arc;

use water_potability::config::{field_spec, AppConfig, FIELD_SPECS};
use water_potability::data::loader::{load_samples, write_results};
use water_potability::pipeline::batch::{run_batch, BatchReport};
use water_potability::{ArtifactStore, Feature, Outcome, RawInputs};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Artifacts loaded at startup; shared, never mutated.
    pub store: Arc<ArtifactStore>,

    /// Whether fields may be marked unknown.
    pub allow_missing: bool,

    /// Current widget value per feature, canonical order.
    pub values: [f64; Feature::COUNT],

    /// Fields the user marked as unknown.
    pub unknown: [bool; Feature::COUNT],

    /// Result of the last successful prediction.
    pub outcome: Option<Outcome>,

    /// Fields that were filled from defaults in `outcome`.
    pub used_defaults: [bool; Feature::COUNT],

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Last scored batch file and its report.
    pub batch: Option<(PathBuf, BatchReport)>,
}

impl AppState {
    pub fn new(store: Arc<ArtifactStore>, config: &AppConfig) -> Self {
        Self {
            store,
            allow_missing: config.allow_missing,
            values: FIELD_SPECS.map(|spec| spec.initial),
            unknown: [false; Feature::COUNT],
            outcome: None,
            used_defaults: [false; Feature::COUNT],
            status_message: None,
            batch: None,
        }
    }

    /// Set a field, clamped to its widget bounds.
    pub fn set_value(&mut self, feature: Feature, value: f64) {
        self.values[feature.index()] = field_spec(feature).clamp(value);
    }

    pub fn set_unknown(&mut self, feature: Feature, unknown: bool) {
        self.unknown[feature.index()] = unknown && self.allow_missing;
    }

    pub fn is_unknown(&self, feature: Feature) -> bool {
        self.allow_missing && self.unknown[feature.index()]
    }

    /// Snapshot of the form as a fresh request.
    pub fn raw_inputs(&self) -> RawInputs {
        let mut raw = RawInputs::new();
        for feature in Feature::ALL {
            let value = if self.is_unknown(feature) {
                None
            } else {
                Some(field_spec(feature).clamp(self.values[feature.index()]))
            };
            raw.set(feature, value);
        }
        raw
    }

    /// Run the pipeline on the current form.
    pub fn predict(&mut self) {
        let raw = self.raw_inputs();
        match self.store.predict(&raw) {
            Ok(outcome) => {
                log::info!("{}", outcome.verdict.message);
                self.used_defaults = Feature::ALL.map(|f| raw.get(f).is_none());
                self.outcome = Some(outcome);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Prediction failed: {e}");
                self.outcome = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Restore the initial form.
    pub fn reset(&mut self) {
        self.values = FIELD_SPECS.map(|spec| spec.initial);
        self.unknown = [false; Feature::COUNT];
        self.outcome = None;
        self.used_defaults = [false; Feature::COUNT];
        self.status_message = None;
    }

    /// Score every row of a sample CSV.
    pub fn score_file(&mut self, path: &Path) {
        match load_samples(path) {
            Ok(samples) => {
                let report = run_batch(&self.store, &samples);
                self.batch = Some((path.to_path_buf(), report));
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load samples: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Write the current batch report as CSV.
    pub fn export_results(&mut self, path: &Path) {
        let Some((_, report)) = &self.batch else {
            self.status_message = Some("Nothing to export: score a CSV first.".into());
            return;
        };
        if let Err(e) = write_results(path, report) {
            log::error!("Failed to export results: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        } else {
            self.status_message = Some(format!("Results written to {}", path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use water_potability::{Classifier, PredictError, Scaler};

    fn state(allow_missing: bool, defaults: &[(Feature, f64)]) -> AppState {
        let mut coefficients = vec![0.0; 9];
        coefficients[Feature::Ph.index()] = 1.0;
        let store = ArtifactStore::new(
            Classifier::Logistic {
                coefficients,
                intercept: -7.0,
                threshold: 0.5,
            },
            Scaler::Identity { n_features: 9 },
            defaults.iter().copied().collect(),
        )
        .unwrap();
        let config = AppConfig {
            allow_missing,
            ..AppConfig::default()
        };
        AppState::new(Arc::new(store), &config)
    }

    #[test]
    fn form_starts_at_initial_values() {
        let s = state(true, &[]);
        let raw = s.raw_inputs();
        assert_eq!(raw.get(Feature::Ph), Some(7.0));
        assert_eq!(raw.get(Feature::Solids), Some(10000.0));
        assert_eq!(raw.get(Feature::Turbidity), Some(3.5));
    }

    #[test]
    fn values_are_clamped_to_widget_bounds() {
        let mut s = state(true, &[]);
        s.set_value(Feature::Ph, 20.0);
        assert_eq!(s.raw_inputs().get(Feature::Ph), Some(14.0));
    }

    #[test]
    fn unknown_field_uses_default() {
        let mut s = state(true, &[(Feature::Ph, 9.0)]);
        s.set_unknown(Feature::Ph, true);
        s.predict();

        let outcome = s.outcome.as_ref().unwrap();
        assert_eq!(outcome.vector.get(Feature::Ph), 9.0);
        assert!(outcome.verdict.is_potable);
        assert!(s.used_defaults[Feature::Ph.index()]);
        assert!(!s.used_defaults[Feature::Hardness.index()]);
        assert!(s.status_message.is_none());
    }

    #[test]
    fn unknown_is_ignored_when_missing_values_are_disabled() {
        let mut s = state(false, &[]);
        s.set_unknown(Feature::Ph, true);
        assert_eq!(s.raw_inputs().get(Feature::Ph), Some(7.0));
    }

    #[test]
    fn failure_clears_previous_verdict() {
        let mut s = state(true, &[]);
        s.predict();
        assert!(s.outcome.is_some());

        s.set_unknown(Feature::Sulfate, true);
        s.predict();
        assert!(s.outcome.is_none());
        let expected = PredictError::MissingFeature {
            field: Feature::Sulfate,
        };
        assert_eq!(s.status_message, Some(format!("Error: {expected}")));
    }

    #[test]
    fn reset_restores_the_form() {
        let mut s = state(true, &[(Feature::Turbidity, 3.0)]);
        s.set_value(Feature::Hardness, 321.0);
        s.set_unknown(Feature::Turbidity, true);
        s.predict();
        assert!(s.used_defaults[Feature::Turbidity.index()]);

        s.reset();
        assert_eq!(s.values, FIELD_SPECS.map(|spec| spec.initial));
        assert!(!s.is_unknown(Feature::Turbidity));
        assert!(s.outcome.is_none());
        assert_eq!(s.used_defaults, [false; Feature::COUNT]);
    }

    #[test]
    fn export_without_batch_reports_status() {
        let mut s = state(true, &[]);
        s.export_results(Path::new("unused.csv"));
        assert!(s.status_message.unwrap().contains("Nothing to export"));
    }
}
