//! Write a demo artifact bundle and a sample CSV.
//!
//! ```text
//! cargo run --bin generate_artifacts -- [output_dir]
//! ```
//!
//! The scaler and defaults use the column statistics of the public
//! water-potability dataset; the model is a small hand-built symmetric-tree
//! ensemble over standardized inputs.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use water_potability::pipeline::engine::{ObliviousSplit, ObliviousTree};
use water_potability::store::{DEFAULTS_FILE, MODEL_FILE, SCALER_FILE};
use water_potability::{ArtifactStore, Classifier, Defaults, Feature, Scaler};

/// (mean, std) per feature, canonical order.
const STATS: [(f64, f64); Feature::COUNT] = [
    (7.08, 1.59),
    (196.37, 32.88),
    (22014.09, 8768.57),
    (7.12, 1.58),
    (333.78, 41.42),
    (426.21, 80.82),
    (14.28, 3.31),
    (66.40, 16.18),
    (3.97, 0.78),
];

/// Fields that are often blank in the source dataset.
const SPARSE: [Feature; 3] = [Feature::Ph, Feature::Sulfate, Feature::Trihalomethanes];

const N_SAMPLES: usize = 60;

fn split(feature: Feature, border: f64) -> ObliviousSplit {
    ObliviousSplit {
        feature: feature.index(),
        border,
    }
}

fn tree(splits: [ObliviousSplit; 2], leaf_values: [f64; 4]) -> ObliviousTree {
    ObliviousTree {
        splits: splits.to_vec(),
        leaf_values: leaf_values.to_vec(),
    }
}

fn demo_classifier() -> Classifier {
    // Leaf index bit i is set when split i fires; index 2 (upper without
    // lower) cannot occur for nested borders on the same feature.
    let trees = vec![
        tree(
            [split(Feature::Ph, -1.0), split(Feature::Ph, 1.0)],
            [-0.6, 0.35, 0.0, -0.5],
        ),
        tree(
            [split(Feature::Sulfate, -1.5), split(Feature::Sulfate, 1.5)],
            [-0.4, 0.25, 0.0, -0.4],
        ),
        tree(
            [split(Feature::Solids, 1.0), split(Feature::Chloramines, 1.0)],
            [0.1, -0.2, -0.2, -0.5],
        ),
        tree(
            [split(Feature::Turbidity, 1.0), split(Feature::Trihalomethanes, 1.5)],
            [0.1, -0.3, -0.2, -0.5],
        ),
    ];
    Classifier::ObliviousTrees {
        n_features: Feature::COUNT,
        trees,
        bias: -0.45,
        scale: 1.0,
        threshold: 0.5,
    }
}

fn demo_scaler() -> Scaler {
    Scaler::Standard {
        mean: STATS.iter().map(|(m, _)| *m).collect(),
        scale: STATS.iter().map(|(_, s)| *s).collect(),
    }
}

fn demo_defaults() -> Defaults {
    Feature::ALL.into_iter().map(|f| (f, STATS[f.index()].0)).collect()
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_samples(path: &Path, rng: &mut StdRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating sample CSV")?;
    let mut header: Vec<&str> = Feature::ALL.iter().map(|f| f.key()).collect();
    header.push("Potability");
    writer.write_record(&header)?;

    let dists = STATS
        .iter()
        .map(|&(m, s)| Normal::new(m, s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow!("invalid distribution: {e}"))?;

    for _ in 0..N_SAMPLES {
        let values: Vec<f64> = dists.iter().map(|d| d.sample(rng).max(0.0)).collect();

        // Rough rule of thumb with label noise, so accuracy is not trivially 1.
        let ph = values[Feature::Ph.index()];
        let turbidity = values[Feature::Turbidity.index()];
        let mut potable = (6.5..=8.5).contains(&ph) && turbidity < 5.0;
        if rng.gen_bool(0.2) {
            potable = !potable;
        }

        let mut record: Vec<String> = Feature::ALL
            .iter()
            .zip(&values)
            .map(|(f, v)| {
                if SPARSE.contains(f) && rng.gen_bool(0.15) {
                    String::new()
                } else {
                    format!("{v:.4}")
                }
            })
            .collect();
        record.push(u8::from(potable).to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let classifier = demo_classifier();
    let scaler = demo_scaler();
    let defaults = demo_defaults();

    // Refuse to write a bundle the app would reject at startup.
    ArtifactStore::new(classifier.clone(), scaler.clone(), defaults.clone())
        .context("demo artifacts are inconsistent")?;

    write_json(&out_dir.join(MODEL_FILE), &classifier)?;
    write_json(&out_dir.join(SCALER_FILE), &scaler)?;
    write_json(&out_dir.join(DEFAULTS_FILE), &defaults)?;

    let mut rng = StdRng::seed_from_u64(42);
    let samples_path = out_dir.join("samples.csv");
    write_samples(&samples_path, &mut rng)?;

    println!(
        "Wrote {MODEL_FILE}, {SCALER_FILE}, {DEFAULTS_FILE} and {N_SAMPLES} samples to {}",
        out_dir.display()
    );
    Ok(())
}
