use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;

use super::model::{Defaults, Feature, RawInputs, Sample};
use crate::error::{ArtifactKind, ArtifactLoadError, InvalidArtifact};
use crate::pipeline::batch::BatchReport;
use crate::pipeline::engine::{Classifier, Scaler};
use crate::store::{ArtifactPaths, ArtifactStore};

/// Header of the label column in the water-potability dataset.
const LABEL_COLUMN: &str = "Potability";

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Load model, scaler and defaults, and check they fit together.
///
/// Expected layouts:
///
/// ```json
/// // model.json
/// { "kind": "logistic", "coefficients": [9 numbers], "intercept": -0.4 }
/// // scaler.json
/// { "kind": "standard", "mean": [9 numbers], "scale": [9 numbers] }
/// // defaults.json
/// { "ph": 7.08, "Sulfate": 333.78, "Trihalomethanes": 66.4 }
/// ```
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<ArtifactStore, ArtifactLoadError> {
    let classifier: Classifier = read_json(&paths.model)
        .map_err(|e| ArtifactLoadError::new(ArtifactKind::Model, &paths.model, format!("{e:#}")))?;
    let scaler: Scaler = read_json(&paths.scaler)
        .map_err(|e| ArtifactLoadError::new(ArtifactKind::Scaler, &paths.scaler, format!("{e:#}")))?;
    let defaults: Defaults = read_json(&paths.defaults).map_err(|e| {
        ArtifactLoadError::new(ArtifactKind::Defaults, &paths.defaults, format!("{e:#}"))
    })?;

    if let Err(InvalidArtifact { kind, reason }) = check_compatible(&classifier, &scaler, &defaults)
    {
        let path = match kind {
            ArtifactKind::Model => &paths.model,
            ArtifactKind::Scaler => &paths.scaler,
            ArtifactKind::Defaults => &paths.defaults,
        };
        return Err(ArtifactLoadError::new(kind, path, reason));
    }

    log::info!(
        "Loaded {} classifier ({} features) from {}",
        classifier_name(&classifier),
        classifier.n_features(),
        paths.model.display()
    );
    log::info!(
        "Loaded scaler ({} features) from {}; {} defaults from {}",
        scaler.n_features(),
        paths.scaler.display(),
        defaults.len(),
        paths.defaults.display()
    );

    Ok(ArtifactStore::from_parts(classifier, scaler, defaults))
}

/// Checks shared by [`load_artifacts`] and [`ArtifactStore::new`].
pub(crate) fn check_compatible(
    classifier: &Classifier,
    scaler: &Scaler,
    defaults: &Defaults,
) -> std::result::Result<(), InvalidArtifact> {
    scaler.validate()?;
    if scaler.n_features() != Feature::COUNT {
        return Err(InvalidArtifact::new(
            ArtifactKind::Scaler,
            format!(
                "scaler was fitted on {} features, expected {}",
                scaler.n_features(),
                Feature::COUNT
            ),
        ));
    }

    classifier.validate()?;
    if classifier.n_features() != scaler.n_features() {
        return Err(InvalidArtifact::new(
            ArtifactKind::Model,
            format!(
                "classifier expects {} features but scaler produces {}",
                classifier.n_features(),
                scaler.n_features()
            ),
        ));
    }

    if let Some((feature, value)) = defaults.iter().find(|(_, v)| !v.is_finite()) {
        return Err(InvalidArtifact::new(
            ArtifactKind::Defaults,
            format!("default for {feature} is not finite ({value})"),
        ));
    }
    Ok(())
}

fn classifier_name(classifier: &Classifier) -> &'static str {
    match classifier {
        Classifier::Logistic { .. } => "logistic",
        Classifier::ObliviousTrees { .. } => "oblivious-tree",
        Classifier::TreeEnsemble { .. } => "tree-ensemble",
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing JSON")
}

// ---------------------------------------------------------------------------
// Sample CSV
// ---------------------------------------------------------------------------

enum Column {
    Feature(Feature),
    Label,
    Ignored,
}

/// Load water samples from a CSV with a header row.
///
/// Columns are matched to features by name (`ph`, `Hardness`, …, matching
/// is case-insensitive); an optional `Potability` column supplies the known
/// label; anything else is ignored. Empty cells are missing inputs, and so
/// are cells a short row does not reach; extra cells are dropped. A cell
/// that does not parse as a number is kept as NaN so the row fails on its
/// own when predicted.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<Column> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| {
            if h.trim().eq_ignore_ascii_case(LABEL_COLUMN) {
                Column::Label
            } else {
                Feature::from_name(h).map_or(Column::Ignored, Column::Feature)
            }
        })
        .collect();

    if !columns.iter().any(|c| matches!(c, Column::Feature(_))) {
        bail!("CSV has no recognised feature columns");
    }

    let mut samples = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result.with_context(|| format!("CSV row {row}"))?;

        if record.len() != columns.len() {
            log::warn!(
                "Row {row}: {} fields, header has {}",
                record.len(),
                columns.len()
            );
        }

        let mut inputs = RawInputs::new();
        let mut expected = None;

        for (column, cell) in columns.iter().zip(record.iter()) {
            let cell = cell.trim();
            match column {
                Column::Feature(feature) => inputs.set(*feature, parse_cell(cell, row, *feature)),
                Column::Label => expected = parse_label(cell, row),
                Column::Ignored => {}
            }
        }

        samples.push(Sample {
            row,
            inputs,
            expected,
        });
    }

    log::info!("Loaded {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

fn parse_cell(cell: &str, row: usize, feature: Feature) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Row {row}, {feature}: '{cell}' is not a number");
            Some(f64::NAN)
        }
    }
}

fn parse_label(cell: &str, row: usize) -> Option<u8> {
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(v) if v == 0.0 => Some(0),
        Ok(v) if v == 1.0 => Some(1),
        _ => {
            log::warn!("Row {row}: ignoring potability label '{cell}'");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Results CSV
// ---------------------------------------------------------------------------

/// Write one line per batch row: resolved features, label, probability,
/// confidence and message. Failed rows keep the row number and the error
/// text, with the numeric columns left empty.
pub fn write_results(path: &Path, report: &BatchReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating results CSV")?;

    let mut header = vec!["row"];
    header.extend(Feature::ALL.iter().map(|f| f.key()));
    header.extend(["expected", "label", "probability", "confidence_percent", "message"]);
    writer.write_record(&header).context("writing CSV header")?;

    for row in &report.rows {
        let mut record = vec![row.row.to_string()];
        let expected = row.expected.map(|e| e.to_string()).unwrap_or_default();
        match &row.outcome {
            Ok(outcome) => {
                record.extend(outcome.vector.iter().map(|(_, v)| v.to_string()));
                record.push(expected);
                record.push(outcome.result.label.to_string());
                record.push(format!("{:.6}", outcome.result.probability));
                record.push(format!("{:.2}", outcome.verdict.confidence_percent));
                record.push(outcome.verdict.message.clone());
            }
            Err(e) => {
                record.extend(std::iter::repeat(String::new()).take(Feature::COUNT));
                record.push(expected);
                record.extend([String::new(), String::new(), String::new()]);
                record.push(e.to_string());
            }
        }
        writer
            .write_record(&record)
            .with_context(|| format!("writing result row {}", row.row))?;
    }

    writer.flush().context("flushing results CSV")?;
    log::info!("Wrote {} result rows to {}", report.rows.len(), path.display());
    Ok(())
}
