use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::verdict_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Bottom panel – batch results
// ---------------------------------------------------------------------------

/// Render one line per scored sample.
pub fn batch_table(ui: &mut Ui, state: &AppState) {
    let Some((path, report)) = &state.batch else {
        return;
    };

    ui.strong(format!("Batch: {}", path.display()));

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(50.0))
        .column(Column::exact(70.0))
        .column(Column::exact(90.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Row");
            });
            header.col(|ui| {
                ui.strong("Expected");
            });
            header.col(|ui| {
                ui.strong("P(potable)");
            });
            header.col(|ui| {
                ui.strong("Verdict");
            });
        })
        .body(|body| {
            body.rows(18.0, report.rows.len(), |mut row| {
                let r = &report.rows[row.index()];
                row.col(|ui| {
                    ui.monospace(r.row.to_string());
                });
                row.col(|ui| {
                    let text = r.expected.map(|e| e.to_string()).unwrap_or_else(|| "–".into());
                    ui.label(text);
                });
                match &r.outcome {
                    Ok(outcome) => {
                        row.col(|ui| {
                            ui.monospace(format!("{:.4}", outcome.result.probability));
                        });
                        row.col(|ui| {
                            let mut text = RichText::new(&outcome.verdict.message)
                                .color(verdict_color(outcome.verdict.is_potable));
                            if r.is_correct() == Some(false) {
                                text = text.strikethrough();
                            }
                            ui.label(text);
                        });
                    }
                    Err(e) => {
                        row.col(|ui| {
                            ui.label("–");
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(e.to_string()).color(Color32::RED));
                        });
                    }
                }
            });
        });
}
