use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarSalesApp {
    pub state: AppState,
}

impl CarSalesApp {
    /// Load the configured source right away so the first frame has data.
    pub fn new(mut state: AppState) -> Self {
        let pending = state.status_message.take();
        state.refresh();
        // A config problem reported before the first load stays visible.
        if pending.is_some() && state.status_message.is_none() {
            state.status_message = pending;
        }
        Self { state }
    }
}

impl eframe::App for CarSalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart and filter controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: data preview ----
        if self.state.show_table {
            if let Some(view) = &self.state.view {
                egui::TopBottomPanel::bottom("data_table")
                    .resizable(true)
                    .default_height(220.0)
                    .show(ctx, |ui| {
                        table::data_table(ui, view);
                    });
            }
        }

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chart_area(ui, &self.state);
        });
    }
}
