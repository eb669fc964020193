use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Options");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("The dataset has no records.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            age_range(ui, state);
            ui.separator();
            job_selection(ui, state);
            if state.dataset.months.is_some() {
                ui.separator();
                month_selection(ui, state);
            }
            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });
}

fn age_range(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Age Range:");
    let (lo, hi) = state.age_bounds();
    let mut min = state.criteria.age_min;
    let mut max = state.criteria.age_max;

    let min_changed = ui
        .add(egui::Slider::new(&mut min, lo..=hi).text("from"))
        .changed();
    let max_changed = ui
        .add(egui::Slider::new(&mut max, lo..=hi).text("to"))
        .changed();

    // The sliders push each other rather than cross.
    if min_changed && min > max {
        max = min;
    }
    if max_changed && max < min {
        min = max;
    }
    if min_changed || max_changed {
        state.set_age_range(min, max);
    }
}

fn job_selection(ui: &mut Ui, state: &mut AppState) {
    let jobs: Vec<String> = state.dataset.jobs.iter().cloned().collect();
    let header = format!(
        "Select Job Types:  ({}/{})",
        state.criteria.jobs.len(),
        jobs.len()
    );

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("job_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_jobs();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_jobs();
                }
            });

            for job in &jobs {
                let mut checked = state.criteria.jobs.contains(job);
                let text = RichText::new(job).color(state.job_colors.color_for(job));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_job(job);
                }
            }
        });
}

fn month_selection(ui: &mut Ui, state: &mut AppState) {
    let Some(domain) = state.dataset.months.clone() else {
        return;
    };
    let n_selected = state.criteria.months.as_ref().map_or(0, |m| m.len());
    let header = format!("Campaign Months:  ({n_selected}/{})", domain.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("month_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_months();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_months();
                }
            });

            for month in &domain {
                let mut checked = state
                    .criteria
                    .months
                    .as_ref()
                    .is_some_and(|m| m.contains(month));
                if ui.checkbox(&mut checked, month.as_str()).changed() {
                    state.toggle_month(month);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Header – title, metrics and insight highlights
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(
            RichText::new("Bank Customer Insights & Marketing Optimization Dashboard")
                .strong()
                .size(24.0),
        );
    });
    ui.add_space(8.0);

    let snapshot = state.snapshot();
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Customers", state.dataset.len());
        metric(&mut cols[1], "Filtered Customers", snapshot.visible_indices.len());
        metric(&mut cols[2], "Job Types Selected", state.criteria.jobs.len());
    });
    ui.add_space(8.0);

    insight_block(ui, state);
}

fn metric(ui: &mut Ui, label: &str, value: usize) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value.to_string()).size(28.0).strong());
    });
}

fn insight_block(ui: &mut Ui, state: &AppState) {
    let summary = &state.snapshot().summary;
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(28, 55, 84))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Insight Highlights").strong().color(Color32::WHITE));

            for line in summary.to_string().lines() {
                bullet(ui, line);
            }
        });
}

fn bullet(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(format!("•  {text}")).color(Color32::from_gray(230)));
}

// ---------------------------------------------------------------------------
// Tab bar
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, RichText::new(tab.label()).strong());
        }
    });
}

// ---------------------------------------------------------------------------
// Overview tab – filter summary
// ---------------------------------------------------------------------------

pub fn filter_summary(ui: &mut Ui, state: &AppState) {
    ui.heading("Summary of Current Filters");
    let criteria = &state.criteria;
    ui.label(format!(
        "• Age range: {}–{}",
        criteria.age_min, criteria.age_max
    ));
    let jobs: Vec<&str> = criteria.jobs.iter().map(String::as_str).collect();
    ui.label(format!("• Selected jobs: {}", jobs.join(", ")));
    if let Some(months) = &criteria.months {
        let months: Vec<&str> = months.iter().map(String::as_str).collect();
        ui.label(format!("• Selected months: {}", months.join(", ")));
    }
}

/// Shown in place of a chart that has nothing to draw.
pub fn warning(ui: &mut Ui, text: &str) {
    ui.colored_label(Color32::from_rgb(230, 160, 0), format!("⚠ {text}"));
}
