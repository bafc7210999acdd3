use crate::data::model::{Defaults, Feature, FeatureVector, RawInputs};
use crate::error::PredictError;

/// Resolve every feature, in canonical order, into a complete vector.
///
/// A supplied value wins; otherwise the default is used; otherwise the
/// request fails naming the first unresolved field. No range checks are
/// made here, only finiteness.
pub fn build(raw: &RawInputs, defaults: &Defaults) -> Result<FeatureVector, PredictError> {
    let mut values = [0.0; Feature::COUNT];

    for feature in Feature::ALL {
        let value = match raw.get(feature) {
            Some(v) => v,
            None => defaults
                .get(feature)
                .ok_or(PredictError::MissingFeature { field: feature })?,
        };
        if !value.is_finite() {
            return Err(PredictError::InvalidValue {
                field: feature,
                value,
            });
        }
        values[feature.index()] = value;
    }

    Ok(FeatureVector::from_array(values))
}
