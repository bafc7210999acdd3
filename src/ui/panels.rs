use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use water_potability::config::FIELD_SPECS;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – measurement form
// ---------------------------------------------------------------------------

/// Render the input form: one slider per field, optional "unknown" toggles,
/// and the Predict / Reset buttons.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("💧 Water test results");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for spec in &FIELD_SPECS {
                let feature = spec.feature;
                let i = feature.index();

                ui.horizontal(|ui: &mut Ui| {
                    ui.strong(feature.label());
                    if state.allow_missing {
                        let mut unknown = state.unknown[i];
                        if ui
                            .checkbox(&mut unknown, "unknown")
                            .on_hover_text("Use the training default for this field")
                            .changed()
                        {
                            state.set_unknown(feature, unknown);
                        }
                    }
                });

                let enabled = !state.is_unknown(feature);
                let mut value = state.values[i];
                let slider = egui::Slider::new(&mut value, spec.min..=spec.max)
                    .step_by(spec.step)
                    .suffix(if spec.unit.is_empty() {
                        String::new()
                    } else {
                        format!(" {}", spec.unit)
                    });
                if ui.add_enabled(enabled, slider).changed() {
                    state.set_value(feature, value);
                }

                if !enabled {
                    let hint = match state.store.defaults().get(feature) {
                        Some(d) => format!("default {d:.2} will be used"),
                        None => "no default available".to_string(),
                    };
                    ui.label(RichText::new(hint).italics().weak());
                }
                ui.add_space(4.0);
            }

            ui.separator();
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("🔎 Predict Potability").clicked() {
                    state.predict();
                }
                if ui.button("Reset").clicked() {
                    state.reset();
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Score CSV…").clicked() {
                open_samples_dialog(state);
                ui.close_menu();
            }
            let can_export = state.batch.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export results…"))
                .clicked()
            {
                save_results_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some((path, report)) = &state.batch {
            let summary = report.summary();
            let mut text = format!(
                "{}: {} scored, {} failed, {} potable",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                summary.succeeded,
                summary.failed,
                summary.potable
            );
            if let Some(acc) = summary.accuracy() {
                text.push_str(&format!(", accuracy {:.1}%", acc * 100.0));
            }
            ui.label(text);
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_samples_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Score water samples")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.score_file(&path);
    }
}

pub fn save_results_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export prediction results")
        .add_filter("CSV", &["csv"])
        .set_file_name("predictions.csv")
        .save_file();

    if let Some(path) = file {
        state.export_results(&path);
    }
}
