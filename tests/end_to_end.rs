//! Public API, from artifact files on disk to a rendered verdict.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use water_potability::data::loader::{load_samples, write_results};
use water_potability::pipeline::batch::run_batch;
use water_potability::pipeline::builder::build;
use water_potability::pipeline::verdict::format;
use water_potability::{
    ArtifactPaths, ArtifactStore, Defaults, Feature, PredictError, PredictionResult, RawInputs,
};

const MODEL: &str = r#"{
    "kind": "oblivious_trees",
    "n_features": 9,
    "bias": -0.45,
    "trees": [
        { "splits": [ { "feature": 0, "border": -1.0 }, { "feature": 0, "border": 1.0 } ],
          "leaf_values": [-0.6, 0.35, 0.0, -0.5] },
        { "splits": [ { "feature": 4, "border": -1.5 }, { "feature": 4, "border": 1.5 } ],
          "leaf_values": [-0.4, 0.25, 0.0, -0.4] }
    ]
}"#;

const SCALER: &str = r#"{
    "kind": "standard",
    "mean": [7.08, 196.37, 22014.09, 7.12, 333.78, 426.21, 14.28, 66.40, 3.97],
    "scale": [1.59, 32.88, 8768.57, 1.58, 41.42, 80.82, 3.31, 16.18, 0.78]
}"#;

const DEFAULTS: &str = r#"{ "ph": 7.08, "Sulfate": 250.0, "Trihalomethanes": 66.4 }"#;

fn write_bundle(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir);
    fs::write(&paths.model, MODEL).unwrap();
    fs::write(&paths.scaler, SCALER).unwrap();
    fs::write(&paths.defaults, DEFAULTS).unwrap();
    paths
}

fn scenario_inputs() -> RawInputs {
    RawInputs::from_named([
        ("ph", Some(7.0)),
        ("Hardness", Some(150.0)),
        ("Solids", Some(10000.0)),
        ("Chloramines", Some(7.0)),
        ("Sulfate", Some(330.0)),
        ("Conductivity", Some(400.0)),
        ("Organic_carbon", Some(10.0)),
        ("Trihalomethanes", Some(60.0)),
        ("Turbidity", Some(3.5)),
    ])
    .unwrap()
}

#[test]
fn all_fields_present_build_in_canonical_order() {
    // defaults would change ph and Sulfate if they were consulted
    let defaults: Defaults = serde_json::from_str(DEFAULTS).unwrap();
    let vector = build(&scenario_inputs(), &defaults).unwrap();
    assert_eq!(
        vector.as_slice(),
        &[7.0, 150.0, 10000.0, 7.0, 330.0, 400.0, 10.0, 60.0, 3.5]
    );
}

#[test]
fn missing_sulfate_takes_default() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::load(&write_bundle(dir.path())).unwrap();

    let mut raw = scenario_inputs();
    raw.set(Feature::Sulfate, None);
    let outcome = store.predict(&raw).unwrap();
    assert_eq!(outcome.vector.get(Feature::Sulfate), 250.0);
}

#[test]
fn potable_and_not_potable_verdicts() {
    let potable = format(&PredictionResult {
        label: 1,
        probability: 0.87,
    });
    assert!(potable.is_potable);
    assert!(potable.message.contains("POTABLE") && !potable.message.contains("NOT"));
    assert_eq!(potable.confidence_percent, 87.0);

    let not_potable = format(&PredictionResult {
        label: 0,
        probability: 0.12,
    });
    assert!(!not_potable.is_potable);
    assert!(not_potable.message.contains("NOT POTABLE"));
    assert_eq!(not_potable.confidence_percent, 12.0);
}

#[test]
fn non_finite_input_is_rejected_without_prediction() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::load(&write_bundle(dir.path())).unwrap();

    let raw = scenario_inputs().with(Feature::Chloramines, f64::INFINITY);
    let err = store.predict(&raw).unwrap_err();
    assert!(matches!(
        err,
        PredictError::InvalidValue {
            field: Feature::Chloramines,
            ..
        }
    ));
}

#[test]
fn scenario_prediction_matches_hand_computation() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::load(&write_bundle(dir.path())).unwrap();

    // ph z ≈ -0.05 (mid leaf 0.35), Sulfate z ≈ -0.09 (mid leaf 0.25)
    let outcome = store.predict(&scenario_inputs()).unwrap();
    let expected = 1.0 / (1.0 + (-(-0.45f64 + 0.35 + 0.25)).exp());
    assert!((outcome.result.probability - expected).abs() < 1e-12);
    assert_eq!(outcome.result.label, 1);
    assert_eq!(outcome.scaled.len(), 9);
}

#[test]
fn batch_file_round_trips_to_results_csv() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::load(&write_bundle(dir.path())).unwrap();

    let samples_path = dir.path().join("samples.csv");
    fs::write(
        &samples_path,
        "ph,Hardness,Solids,Chloramines,Sulfate,Conductivity,Organic_carbon,Trihalomethanes,Turbidity,Potability\n\
         7.0,150,10000,7,330,400,10,60,3.5,1\n\
         ,150,10000,7,,400,10,60,3.5,0\n\
         7.0,,10000,7,330,400,10,60,3.5,1\n",
    )
    .unwrap();

    let samples = load_samples(&samples_path).unwrap();
    let report = run_batch(&store, &samples);
    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        report.rows[2].outcome,
        Err(PredictError::MissingFeature {
            field: Feature::Hardness
        })
    );

    let out = dir.path().join("predictions.csv");
    write_results(&out, &report).unwrap();
    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("row,ph,Hardness"));
    assert!(lines[3].contains("missing field Hardness"));
}
