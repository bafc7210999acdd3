use std::sync::Arc;

use eframe::egui;

use water_potability::config::AppConfig;
use water_potability::ArtifactStore;

use crate::state::AppState;
use crate::ui::{panels, plot, results};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PotabilityApp {
    pub state: AppState,
}

impl PotabilityApp {
    pub fn new(store: Arc<ArtifactStore>, config: &AppConfig) -> Self {
        Self {
            state: AppState::new(store, config),
        }
    }
}

impl eframe::App for PotabilityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: measurement form ----
        egui::SidePanel::left("input_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: batch results ----
        if self.state.batch.is_some() {
            egui::TopBottomPanel::bottom("batch_panel")
                .default_height(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    results::batch_table(ui, &self.state);
                });
        }

        // ---- Central panel: verdict, echoed vector, scaled chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::verdict_view(ui, &self.state);
        });
    }
}
