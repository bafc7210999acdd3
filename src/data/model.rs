use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PredictError;

// ---------------------------------------------------------------------------
// Feature – one of the nine measured fields
// ---------------------------------------------------------------------------

/// A water-quality measurement, in the order the artifacts were fitted with.
///
/// The derived `Ord` follows declaration order, so any `BTreeMap<Feature, _>`
/// iterates in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Ph,
    Hardness,
    Solids,
    Chloramines,
    Sulfate,
    Conductivity,
    OrganicCarbon,
    Trihalomethanes,
    Turbidity,
}

impl Feature {
    /// All features in canonical order.
    pub const ALL: [Feature; 9] = [
        Feature::Ph,
        Feature::Hardness,
        Feature::Solids,
        Feature::Chloramines,
        Feature::Sulfate,
        Feature::Conductivity,
        Feature::OrganicCarbon,
        Feature::Trihalomethanes,
        Feature::Turbidity,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Column name in the water-potability dataset and in artifact files.
    pub fn key(self) -> &'static str {
        match self {
            Feature::Ph => "ph",
            Feature::Hardness => "Hardness",
            Feature::Solids => "Solids",
            Feature::Chloramines => "Chloramines",
            Feature::Sulfate => "Sulfate",
            Feature::Conductivity => "Conductivity",
            Feature::OrganicCarbon => "Organic_carbon",
            Feature::Trihalomethanes => "Trihalomethanes",
            Feature::Turbidity => "Turbidity",
        }
    }

    /// Human-facing label for widgets and tables.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Ph => "pH",
            Feature::OrganicCarbon => "Organic Carbon",
            other => other.key(),
        }
    }

    /// Position in the feature vector.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a field name. Case-insensitive; `_`, `-` and spaces are
    /// interchangeable, so `pH`, `Organic Carbon` and `organic_carbon` all
    /// resolve.
    pub fn from_name(name: &str) -> Option<Feature> {
        let wanted = normalize_name(name);
        Self::ALL
            .into_iter()
            .find(|f| normalize_name(f.key()) == wanted)
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Feature {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::from_name(s).ok_or_else(|| PredictError::UnknownFeature {
            name: s.to_string(),
        })
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Feature::from_name(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown feature '{name}'")))
    }
}

// ---------------------------------------------------------------------------
// FeatureVector – complete, ordered model input
// ---------------------------------------------------------------------------

/// The nine resolved measurements in canonical order. Every value is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; Feature::COUNT]);

impl FeatureVector {
    /// Only the builder creates vectors, after checking finiteness.
    pub(crate) fn from_array(values: [f64; Feature::COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().zip(self.0.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// RawInputs – one request's user-supplied values
// ---------------------------------------------------------------------------

/// Per-request inputs. A field that is absent, or present as `None`, falls
/// back to the defaults when the vector is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInputs {
    values: BTreeMap<Feature, Option<f64>>,
}

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from string-keyed pairs, rejecting names that are not features.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self, PredictError>
    where
        I: IntoIterator<Item = (&'a str, Option<f64>)>,
    {
        let mut inputs = Self::new();
        for (name, value) in pairs {
            let feature: Feature = name.parse()?;
            inputs.set(feature, value);
        }
        Ok(inputs)
    }

    pub fn set(&mut self, feature: Feature, value: Option<f64>) {
        self.values.insert(feature, value);
    }

    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, Some(value));
        self
    }

    /// The supplied value, or `None` when absent or explicitly null.
    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Defaults – fallback values from training statistics
// ---------------------------------------------------------------------------

/// Fallback value per feature, loaded once with the other artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Defaults {
    values: BTreeMap<Feature, f64>,
}

impl Defaults {
    pub fn new(values: BTreeMap<Feature, f64>) -> Self {
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.values.get(&feature).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.values.iter().map(|(f, v)| (*f, *v))
    }
}

/// Names are matched like [`Feature::from_name`], so two spellings of the
/// same field (`ph` and `pH`) are a duplicate and rejected.
impl<'de> Deserialize<'de> for Defaults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DefaultsVisitor;

        impl<'de> serde::de::Visitor<'de> for DefaultsVisitor {
            type Value = Defaults;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from feature name to number")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<Defaults, A::Error> {
                let mut values = BTreeMap::new();
                while let Some((feature, value)) = map.next_entry::<Feature, f64>()? {
                    if values.insert(feature, value).is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate default for {feature}"
                        )));
                    }
                }
                Ok(Defaults { values })
            }
        }

        deserializer.deserialize_map(DefaultsVisitor)
    }
}

impl FromIterator<(Feature, f64)> for Defaults {
    fn from_iter<T: IntoIterator<Item = (Feature, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample – one row of a batch file
// ---------------------------------------------------------------------------

/// A measured water sample read from a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// 1-based record number (header excluded).
    pub row: usize,
    pub inputs: RawInputs,
    /// Known potability label, when the file carries one.
    pub expected: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_matches_indices() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
        assert_eq!(Feature::ALL[0].key(), "ph");
        assert_eq!(Feature::ALL[8].key(), "Turbidity");
    }

    #[test]
    fn name_lookup_is_forgiving() {
        assert_eq!(Feature::from_name("pH"), Some(Feature::Ph));
        assert_eq!(Feature::from_name("PH"), Some(Feature::Ph));
        assert_eq!(Feature::from_name("Organic Carbon"), Some(Feature::OrganicCarbon));
        assert_eq!(Feature::from_name("organic_carbon"), Some(Feature::OrganicCarbon));
        assert_eq!(Feature::from_name(" sulfate "), Some(Feature::Sulfate));
        assert_eq!(Feature::from_name("Potability"), None);
    }

    #[test]
    fn from_named_rejects_unknown_fields() {
        let err = RawInputs::from_named([("ph", Some(7.0)), ("Lead", Some(0.1))]).unwrap_err();
        assert_eq!(
            err,
            PredictError::UnknownFeature {
                name: "Lead".to_string()
            }
        );
    }

    #[test]
    fn explicit_null_reads_as_absent() {
        let mut raw = RawInputs::new();
        raw.set(Feature::Sulfate, None);
        assert_eq!(raw.get(Feature::Sulfate), None);
        assert_eq!(raw.get(Feature::Turbidity), None);
    }

    #[test]
    fn defaults_deserialize_from_names() {
        let json = r#"{ "ph": 7.08, "Sulfate": 333.8, "Trihalomethanes": 66.4 }"#;
        let defaults: Defaults = serde_json::from_str(json).unwrap();
        assert_eq!(defaults.len(), 3);
        assert_eq!(defaults.get(Feature::Sulfate), Some(333.8));
        assert_eq!(defaults.get(Feature::Hardness), None);

        let bad = serde_json::from_str::<Defaults>(r#"{ "Lead": 1.0 }"#);
        assert!(bad.is_err());
    }

    #[test]
    fn defaults_reject_two_spellings_of_one_field() {
        let err = serde_json::from_str::<Defaults>(r#"{ "ph": 1.0, "pH": 9.0 }"#).unwrap_err();
        assert!(err.to_string().contains("duplicate default for ph"), "{err}");
    }
}
