use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;
use crate::ui::panels::warning;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Data sample tab – first rows of the filtered view
// ---------------------------------------------------------------------------

pub fn data_preview(ui: &mut Ui, state: &AppState) {
    ui.heading("Filtered Data Preview");

    let view = state.view();
    if view.is_empty() {
        warning(ui, "No customers match the current filters.");
    } else {
        let columns = &state.dataset.columns;
        let rows: Vec<_> = view.records().take(state.config.preview_rows).collect();

        ScrollArea::horizontal()
            .id_salt("preview_scroll")
            .show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .resizable(true)
                    .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                    .columns(Column::auto().at_least(48.0), columns.len())
                    .header(ROW_HEIGHT, |mut header| {
                        for name in columns {
                            header.col(|ui: &mut Ui| {
                                ui.strong(name);
                            });
                        }
                    })
                    .body(|mut body| {
                        for record in &rows {
                            body.row(ROW_HEIGHT, |mut row| {
                                for value in &record.values {
                                    row.col(|ui: &mut Ui| {
                                        ui.label(value.to_string());
                                    });
                                }
                            });
                        }
                    });
            });
    }

    ui.add_space(8.0);
    egui::CollapsingHeader::new("Interpretation")
        .id_salt("preview_interpretation")
        .show(ui, |ui: &mut Ui| {
            ui.label(format!(
                "This table shows the first {} customers that match your selected filters. \
                 Use it to explore individual-level data before diving into visual analytics.",
                state.config.preview_rows
            ));
        });
}
