use std::path::PathBuf;

use crate::data::model::Feature;
use crate::error::ConfigError;
use crate::store::ArtifactPaths;

// ---------------------------------------------------------------------------
// Input field table
// ---------------------------------------------------------------------------

/// Widget configuration for one input field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub feature: Feature,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Value the form starts with.
    pub initial: f64,
    pub unit: &'static str,
}

impl FieldSpec {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Advisory bounds enforced by the form widgets, in canonical order. The
/// pipeline itself accepts any finite value.
pub const FIELD_SPECS: [FieldSpec; Feature::COUNT] = [
    FieldSpec { feature: Feature::Ph, min: 0.0, max: 14.0, step: 0.1, initial: 7.0, unit: "" },
    FieldSpec { feature: Feature::Hardness, min: 0.0, max: 500.0, step: 1.0, initial: 150.0, unit: "mg/L" },
    FieldSpec { feature: Feature::Solids, min: 0.0, max: 50000.0, step: 10.0, initial: 10000.0, unit: "ppm" },
    FieldSpec { feature: Feature::Chloramines, min: 0.0, max: 20.0, step: 0.1, initial: 7.0, unit: "ppm" },
    FieldSpec { feature: Feature::Sulfate, min: 0.0, max: 500.0, step: 1.0, initial: 330.0, unit: "mg/L" },
    FieldSpec { feature: Feature::Conductivity, min: 0.0, max: 1500.0, step: 1.0, initial: 400.0, unit: "μS/cm" },
    FieldSpec { feature: Feature::OrganicCarbon, min: 0.0, max: 20.0, step: 0.1, initial: 10.0, unit: "ppm" },
    FieldSpec { feature: Feature::Trihalomethanes, min: 0.0, max: 150.0, step: 0.5, initial: 60.0, unit: "μg/L" },
    FieldSpec { feature: Feature::Turbidity, min: 0.0, max: 15.0, step: 0.1, initial: 3.5, unit: "NTU" },
];

pub fn field_spec(feature: Feature) -> &'static FieldSpec {
    &FIELD_SPECS[feature.index()]
}

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

pub const ENV_ARTIFACT_DIR: &str = "POTABILITY_ARTIFACT_DIR";
pub const ENV_MODEL: &str = "POTABILITY_MODEL";
pub const ENV_SCALER: &str = "POTABILITY_SCALER";
pub const ENV_DEFAULTS: &str = "POTABILITY_DEFAULTS";
pub const ENV_ALLOW_MISSING: &str = "POTABILITY_ALLOW_MISSING";

const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub artifacts: ArtifactPaths,
    /// Whether the form offers "unknown" toggles that fall back to defaults.
    pub allow_missing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths::in_dir(DEFAULT_ARTIFACT_DIR),
            allow_missing: true,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let dir = lookup(ENV_ARTIFACT_DIR).unwrap_or_else(|| DEFAULT_ARTIFACT_DIR.to_string());
        let mut artifacts = ArtifactPaths::in_dir(&dir);
        if let Some(p) = lookup(ENV_MODEL) {
            artifacts.model = PathBuf::from(p);
        }
        if let Some(p) = lookup(ENV_SCALER) {
            artifacts.scaler = PathBuf::from(p);
        }
        if let Some(p) = lookup(ENV_DEFAULTS) {
            artifacts.defaults = PathBuf::from(p);
        }

        let allow_missing = match lookup(ENV_ALLOW_MISSING) {
            None => true,
            Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidFlag {
                var: ENV_ALLOW_MISSING,
                value,
            })?,
        };

        Ok(Self {
            artifacts,
            allow_missing,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn field_table_is_in_canonical_order() {
        for (spec, feature) in FIELD_SPECS.iter().zip(Feature::ALL) {
            assert_eq!(spec.feature, feature);
            assert!(spec.min < spec.max);
            assert!((spec.min..=spec.max).contains(&spec.initial));
        }
        assert_eq!(field_spec(Feature::Solids).max, 50000.0);
    }

    #[test]
    fn clamp_respects_bounds() {
        let ph = field_spec(Feature::Ph);
        assert_eq!(ph.clamp(15.0), 14.0);
        assert_eq!(ph.clamp(-1.0), 0.0);
        assert_eq!(ph.clamp(6.5), 6.5);
    }

    #[test]
    fn defaults_without_environment() {
        let config = AppConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.artifacts.model, PathBuf::from("artifacts/model.json"));
    }

    #[test]
    fn directory_and_overrides() {
        let config = AppConfig::from_vars(vars(&[
            (ENV_ARTIFACT_DIR, "/srv/potability"),
            (ENV_SCALER, "/tmp/other_scaler.json"),
            (ENV_ALLOW_MISSING, "off"),
        ]))
        .unwrap();
        assert_eq!(config.artifacts.model, PathBuf::from("/srv/potability/model.json"));
        assert_eq!(config.artifacts.scaler, PathBuf::from("/tmp/other_scaler.json"));
        assert!(!config.allow_missing);
    }

    #[test]
    fn bad_flag_is_an_error() {
        let err = AppConfig::from_vars(vars(&[(ENV_ALLOW_MISSING, "maybe")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidFlag {
                var: ENV_ALLOW_MISSING,
                value: "maybe".to_string()
            }
        );
    }
}
