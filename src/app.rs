use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BankInsightsApp {
    pub state: AppState,
}

impl BankInsightsApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for BankInsightsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Controls changed last frame: recompute before anything is drawn.
        self.state.refresh();

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, insights, tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::header(ui, &self.state);
            ui.add_space(8.0);
            panels::tab_bar(ui, &mut self.state);
            ui.separator();

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match self.state.tab {
                    Tab::Overview => {
                        panels::filter_summary(ui, &self.state);
                        ui.separator();
                        charts::job_pie(ui, &self.state);
                    }
                    Tab::DataSample => table::data_preview(ui, &self.state),
                    Tab::Visualizations => {
                        charts::age_histogram(ui, &self.state);
                        ui.add_space(12.0);
                        charts::job_counts(ui, &mut self.state);
                    }
                    Tab::Correlations => {
                        charts::correlation_heatmap(ui, &self.state);
                        how_to_read(ui);
                    }
                });
        });

        if self.state.is_dirty() {
            ctx.request_repaint();
        }
    }
}

fn how_to_read(ui: &mut Ui) {
    ui.add_space(8.0);
    egui::CollapsingHeader::new("How to Read This")
        .id_salt("correlation_help")
        .show(ui, |ui: &mut Ui| {
            ui.label("• Values close to 1.0 indicate strong positive relationships");
            ui.label("• Values close to -1.0 indicate strong negative relationships");
            ui.label("• This matrix helps identify which variables influence each other");
        });
}
