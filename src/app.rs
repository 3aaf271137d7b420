use eframe::egui;

use crate::state::{sample_path, AppState, Page};
use crate::ui::{dashboard, panels, prices};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesLensApp {
    pub state: AppState,
}

impl SalesLensApp {
    /// Start with the sample data if it is present.
    pub fn with_sample() -> Self {
        let mut state = AppState::default();
        let sample = sample_path();
        if sample.exists() {
            state.open(&sample);
        } else {
            log::info!("No sample data at {}", sample.display());
        }
        Self { state }
    }
}

impl eframe::App for SalesLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        if self.state.page == Page::Sales {
            egui::SidePanel::left("filter_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Sales => dashboard::sales_dashboard(ui, &mut self.state),
            Page::Prices => prices::price_view(ui, &mut self.state),
        });

        dashboard::raw_data_window(ctx, &mut self.state);
    }
}
