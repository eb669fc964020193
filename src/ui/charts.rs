use std::f64::consts::TAU;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, PlotPoints, Polygon, Text};

use crate::color::{contrasting_text, ColorScale};
use crate::state::AppState;
use crate::ui::panels::warning;
use crate::viz::{Correlation, CorrelationMatrix, SortMode};

const CHART_HEIGHT: f32 = 340.0;
/// Segments per full turn when approximating pie arcs.
const ARC_SEGMENTS: f64 = 180.0;
/// Histogram bars are drawn translucent so overlapping jobs stay visible.
const OVERLAY_ALPHA: u8 = 190;

// ---------------------------------------------------------------------------
// Job distribution pie
// ---------------------------------------------------------------------------

pub fn job_pie(ui: &mut Ui, state: &AppState) {
    ui.strong("Job Distribution (Filtered Data)");
    let distribution = &state.snapshot().distribution;
    if distribution.total == 0 {
        warning(ui, "No customers match the current filters.");
        return;
    }

    let colors = ColorScale::Viridis.discrete(distribution.counts.len());

    Plot::new("job_pie")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for ((job, _), color) in distribution.counts.iter().zip(colors) {
                let share = distribution.share(job);
                let end = start + share * TAU;

                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(slice_points(start, end)))
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(job),
                );
                // Label slices big enough to hold text.
                if share >= 0.04 {
                    let mid = (start + end) / 2.0;
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                            format!("{:.1}%", share * 100.0),
                        )
                        .color(contrasting_text(color)),
                    );
                }
                start = end;
            }
        });
}

/// Closed outline of a unit-circle slice between two angles.
fn slice_points(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) / TAU) * ARC_SEGMENTS).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start + (end - start) * i as f64 / steps as f64;
        points.push([angle.cos(), angle.sin()]);
    }
    points
}

// ---------------------------------------------------------------------------
// Age histogram, one translucent series per job
// ---------------------------------------------------------------------------

pub fn age_histogram(ui: &mut Ui, state: &AppState) {
    ui.heading("Age Distribution by Job Type");
    let histogram = &state.snapshot().histogram;
    if histogram.is_empty() {
        warning(ui, "Not enough data to draw the age distribution.");
        return;
    }

    Plot::new("age_histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("age")
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (job, counts) in &histogram.series {
                let base = state.job_colors.color_for(job);
                let fill =
                    Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), OVERLAY_ALPHA);
                let bars = counts
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| **n > 0)
                    .map(|(i, &n)| {
                        Bar::new(histogram.bucket_center(i), n as f64)
                            .width(histogram.bucket_width)
                            .fill(fill)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(job).color(fill));
            }
        });
}

// ---------------------------------------------------------------------------
// Sortable job-count bars
// ---------------------------------------------------------------------------

pub fn job_counts(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Job Counts");

    let mut mode = state.sort_mode;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Sort Jobs By:");
        for candidate in [SortMode::Alphabetical, SortMode::MostCommon] {
            ui.radio_value(&mut mode, candidate, candidate.label());
        }
    });
    state.set_sort_mode(mode);

    let counts = &state.snapshot().job_counts;
    if counts.is_empty() {
        warning(ui, "No customers match the current filters.");
        return;
    }

    let max = counts.iter().map(|c| c.1).max().unwrap_or(0) as f64;
    let labels: Vec<String> = counts.iter().map(|(job, _)| job.clone()).collect();
    let bars = counts
        .iter()
        .enumerate()
        .map(|(i, (job, n))| {
            Bar::new(i as f64, *n as f64)
                .width(0.8)
                .name(job)
                .fill(ColorScale::Plasma.sample_range(*n as f64, 0.0, max))
        })
        .collect();

    Plot::new("job_counts")
        .height(CHART_HEIGHT)
        .y_axis_label("count")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("count"));
        });
}

/// Category name for an integer axis position, blank between categories.
fn label_at(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, state: &AppState) {
    ui.heading("Correlation Heatmap");
    match &state.snapshot().correlation {
        Correlation::Unavailable => {
            warning(ui, "Not enough numeric data available for a correlation heatmap.");
        }
        Correlation::Matrix(matrix) if !matrix.has_values() => {
            warning(
                ui,
                "Not enough customers in the current selection to correlate numeric columns.",
            );
        }
        Correlation::Matrix(matrix) => heatmap(ui, matrix),
    }
}

fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.size();
    let x_labels = matrix.columns.clone();
    let y_labels = matrix.columns.clone();

    Plot::new("correlation_heatmap")
        .height(CHART_HEIGHT.max(40.0 * n as f32))
        .data_aspect(1.0)
        .show_grid(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| label_at(&x_labels, mark.value))
        // Rows run top to bottom, so the y axis is negated.
        .y_axis_formatter(move |mark, _range| label_at(&y_labels, -mark.value))
        .show(ui, |plot_ui| {
            for row in 0..n {
                for col in 0..n {
                    let r = matrix.get(row, col);
                    // Map [-1, 1] onto the scale.
                    let fill = ColorScale::Cividis.sample((r + 1.0) / 2.0);
                    let (x, y) = (col as f64, -(row as f64));
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ]))
                        .fill_color(fill)
                        .stroke(Stroke::new(0.5, Color32::from_gray(40))),
                    );
                    let label = if r.is_nan() {
                        "–".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    plot_ui.text(Text::new(PlotPoint::new(x, y), label).color(contrasting_text(fill)));
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_outline_starts_at_centre_and_follows_arc() {
        let pts = slice_points(0.0, TAU / 4.0);
        assert_eq!(pts[0], [0.0, 0.0]);
        assert!((pts[1][0] - 1.0).abs() < 1e-12);
        let [x, y] = pts[pts.len() - 1];
        assert!(x.abs() < 1e-12 && (y - 1.0).abs() < 1e-12);
        // A quarter turn gets a quarter of the segments plus centre and start.
        assert_eq!(pts.len(), 45 + 2);
    }

    #[test]
    fn axis_labels_only_on_integer_positions() {
        let labels = vec!["admin.".to_string(), "student".to_string()];
        assert_eq!(label_at(&labels, 1.0), "student");
        assert_eq!(label_at(&labels, 0.5), "");
        assert_eq!(label_at(&labels, -1.0), "");
        assert_eq!(label_at(&labels, 7.0), "");
    }
}
