use super::engine::PredictionResult;

/// User-facing reading of a [`PredictionResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_potable: bool,
    /// `P(potable) * 100`, rounded to two decimals.
    pub confidence_percent: f64,
    pub message: String,
}

/// Derive the verdict. The confidence is always the potable-class
/// probability, whichever label was predicted.
pub fn format(result: &PredictionResult) -> Verdict {
    let is_potable = result.label == 1;
    let confidence_percent = round2(result.probability * 100.0);

    let message = if is_potable {
        format!("This water is likely POTABLE. Confidence: {confidence_percent:.2}%")
    } else {
        format!("This water is likely NOT POTABLE. Confidence: {confidence_percent:.2}%")
    };

    Verdict {
        is_potable,
        confidence_percent,
        message,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn potable_result() {
        let v = format(&PredictionResult {
            label: 1,
            probability: 0.87,
        });
        assert!(v.is_potable);
        assert_eq!(v.confidence_percent, 87.0);
        assert_eq!(v.message, "This water is likely POTABLE. Confidence: 87.00%");
    }

    #[test]
    fn not_potable_result() {
        let v = format(&PredictionResult {
            label: 0,
            probability: 0.12,
        });
        assert!(!v.is_potable);
        assert_eq!(v.confidence_percent, 12.0);
        assert!(v.message.contains("NOT POTABLE"));
        assert!(v.message.ends_with("12.00%"));
    }

    #[test]
    fn rounds_to_two_decimals() {
        let v = format(&PredictionResult {
            label: 1,
            probability: 0.123456,
        });
        assert_eq!(v.confidence_percent, 12.35);
    }

    proptest! {
        #[test]
        fn format_is_idempotent(label in 0u8..=1, p in 0.0f64..=1.0) {
            let r = PredictionResult { label, probability: p };
            prop_assert_eq!(format(&r), format(&r));
            prop_assert_eq!(format(&r).is_potable, label == 1);
        }

        #[test]
        fn confidence_is_monotone_in_probability(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let c_lo = format(&PredictionResult { label: 0, probability: lo }).confidence_percent;
            let c_hi = format(&PredictionResult { label: 1, probability: hi }).confidence_percent;
            prop_assert!(c_lo <= c_hi);
        }
    }
}
