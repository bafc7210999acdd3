use eframe::egui::{ProgressBar, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Plot};

use water_potability::{Feature, Outcome};

use crate::color::{confidence_color, deviation_color, verdict_color};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel – verdict and the vector it was computed from
// ---------------------------------------------------------------------------

/// Render the last verdict, the echoed feature vector and a chart of the
/// scaled values.
pub fn verdict_view(ui: &mut Ui, state: &AppState) {
    let outcome = match &state.outcome {
        Some(o) => o,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Enter the water test results, then press  🔎 Predict Potability");
            });
            return;
        }
    };

    let verdict = &outcome.verdict;
    let (icon, headline) = if verdict.is_potable {
        ("✅", "This water is likely POTABLE.")
    } else {
        ("⚠", "This water is likely NOT POTABLE.")
    };
    ui.heading(RichText::new(format!("{icon} {headline}")).color(verdict_color(verdict.is_potable)));
    ui.add(
        ProgressBar::new((verdict.confidence_percent / 100.0) as f32)
            .text(format!("Confidence: {:.2}%", verdict.confidence_percent))
            .fill(confidence_color(verdict.confidence_percent)),
    );
    ui.add_space(8.0);

    ui.columns(2, |cols| {
        cols[0].strong("Feature vector");
        cols[0].push_id("feature_table", |ui: &mut Ui| feature_table(ui, state, outcome));
        cols[1].strong("Scaled input");
        scaled_chart(&mut cols[1], outcome);
    });
}

fn feature_table(ui: &mut Ui, state: &AppState, outcome: &Outcome) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Field");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
            header.col(|ui| {
                ui.strong("Source");
            });
        })
        .body(|mut body| {
            for (feature, value) in outcome.vector.iter() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(feature.label());
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{value:.3}"));
                    });
                    row.col(|ui| {
                        if state.used_defaults[feature.index()] {
                            ui.label(RichText::new("default").italics());
                        } else {
                            ui.label("input");
                        };
                    });
                });
            }
        });
}

fn scaled_chart(ui: &mut Ui, outcome: &Outcome) {
    let bars: Vec<Bar> = Feature::ALL
        .iter()
        .zip(outcome.scaled.iter())
        .map(|(feature, &v)| {
            Bar::new(feature.index() as f64, v)
                .name(feature.label())
                .fill(deviation_color(v))
        })
        .collect();

    Plot::new("scaled_plot")
        .x_axis_label("Feature")
        .y_axis_label("Scaled value")
        .x_axis_formatter(|mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            Feature::ALL
                .get(i as usize)
                .map(|f| f.label().to_string())
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .height(ui.available_height().max(160.0))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.6));
        });
}
