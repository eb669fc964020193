use std::collections::BTreeSet;

use crate::color::CategoryColors;
use crate::config::DashboardConfig;
use crate::data::filter::{apply, FilterCriteria, FilteredView};
use crate::data::model::Dataset;
use crate::insight::{summarize, InsightSummary};
use crate::viz::{
    age_histogram, correlation_matrix, job_counts, job_distribution, AgeHistogram, Correlation,
    JobDistribution, SortMode,
};

// ---------------------------------------------------------------------------
// Derived views for one set of criteria
// ---------------------------------------------------------------------------

/// Everything the dashboard draws, recomputed from scratch on every change.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,
    pub summary: InsightSummary,
    pub distribution: JobDistribution,
    pub histogram: AgeHistogram,
    pub job_counts: Vec<(String, usize)>,
    pub correlation: Correlation,
}

impl Snapshot {
    /// Run the filter → summarise → chart pipeline once.
    pub fn compute(
        dataset: &Dataset,
        criteria: &FilterCriteria,
        sort_mode: SortMode,
        histogram_bins: usize,
    ) -> Self {
        let visible_indices = apply(dataset, criteria);
        let view = FilteredView::new(dataset, &visible_indices);

        let summary = summarize(&view);
        let distribution = job_distribution(&view);
        let histogram = age_histogram(&view, histogram_bins);
        let job_counts = job_counts(&view, sort_mode);
        let correlation = correlation_matrix(&view);

        Snapshot {
            summary,
            distribution,
            histogram,
            job_counts,
            correlation,
            visible_indices,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    DataSample,
    Visualizations,
    Correlations,
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::Overview,
        Tab::DataSample,
        Tab::Visualizations,
        Tab::Correlations,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::DataSample => "Data Sample",
            Tab::Visualizations => "Visualizations",
            Tab::Correlations => "Correlations",
        }
    }
}

/// The full UI state, independent of rendering.
///
/// Controls mutate `criteria` / `sort_mode` through the methods below, which
/// mark the state dirty; [`AppState::refresh`] then recomputes the snapshot
/// once before the next frame is drawn.
pub struct AppState {
    /// Loaded once at startup, never mutated.
    pub dataset: Dataset,
    pub config: DashboardConfig,
    pub criteria: FilterCriteria,
    pub sort_mode: SortMode,
    pub tab: Tab,
    pub job_colors: CategoryColors,
    snapshot: Snapshot,
    dirty: bool,
}

impl AppState {
    /// Ingest the loaded dataset with every record selected.
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let criteria = FilterCriteria::everything(&dataset);
        let sort_mode = SortMode::default();
        let snapshot = Snapshot::compute(&dataset, &criteria, sort_mode, config.histogram_bins);
        let job_colors = CategoryColors::new(&dataset.jobs);
        Self {
            dataset,
            config,
            criteria,
            sort_mode,
            tab: Tab::default(),
            job_colors,
            snapshot,
            dirty: false,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute derived views if any control changed since the last call.
    /// Returns whether a recomputation ran.
    pub fn refresh(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.snapshot = Snapshot::compute(
            &self.dataset,
            &self.criteria,
            self.sort_mode,
            self.config.histogram_bins,
        );
        self.dirty = false;
        log::debug!(
            "Recomputed: ages {}..={}, {} jobs, {:?} months -> {} of {} records",
            self.criteria.age_min,
            self.criteria.age_max,
            self.criteria.jobs.len(),
            self.criteria.months.as_ref().map(BTreeSet::len),
            self.snapshot.visible_indices.len(),
            self.dataset.len()
        );
        true
    }

    /// Observed age bounds, used to bound the sliders.
    pub fn age_bounds(&self) -> (i64, i64) {
        self.dataset.age_bounds.unwrap_or((0, 0))
    }

    /// Set the age range, keeping `min ≤ max` and both inside the observed bounds.
    pub fn set_age_range(&mut self, min: i64, max: i64) {
        let (lo, hi) = self.age_bounds();
        let min = min.clamp(lo, hi);
        let max = max.clamp(lo, hi);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if (min, max) != (self.criteria.age_min, self.criteria.age_max) {
            self.criteria.age_min = min;
            self.criteria.age_max = max;
            self.dirty = true;
        }
    }

    /// Toggle a single job.  Values outside the observed domain are ignored.
    pub fn toggle_job(&mut self, job: &str) {
        if !self.dataset.jobs.contains(job) {
            return;
        }
        if !self.criteria.jobs.remove(job) {
            self.criteria.jobs.insert(job.to_string());
        }
        self.dirty = true;
    }

    pub fn select_all_jobs(&mut self) {
        self.criteria.jobs = self.dataset.jobs.clone();
        self.dirty = true;
    }

    pub fn select_no_jobs(&mut self) {
        self.criteria.jobs.clear();
        self.dirty = true;
    }

    /// Toggle a single month.  No-op without a month column.
    pub fn toggle_month(&mut self, month: &str) {
        let (Some(domain), Some(selected)) = (&self.dataset.months, &mut self.criteria.months)
        else {
            return;
        };
        if !domain.contains(month) {
            return;
        }
        if !selected.remove(month) {
            selected.insert(month.to_string());
        }
        self.dirty = true;
    }

    pub fn select_all_months(&mut self) {
        if self.dataset.months.is_some() {
            self.criteria.months = self.dataset.months.clone();
            self.dirty = true;
        }
    }

    pub fn select_no_months(&mut self) {
        if let Some(selected) = &mut self.criteria.months {
            selected.clear();
            self.dirty = true;
        }
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if mode != self.sort_mode {
            self.sort_mode = mode;
            self.dirty = true;
        }
    }

    /// Restore the "everything selected" criteria.
    pub fn reset_filters(&mut self) {
        self.criteria = FilterCriteria::everything(&self.dataset);
        self.dirty = true;
    }

    /// The current view over the dataset.
    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::new(&self.dataset, &self.snapshot.visible_indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::dataset;
    use crate::insight::{SubscriptionRate, NOT_AVAILABLE};

    fn state() -> AppState {
        let ds = dataset(&[
            (30, "admin", Some("may"), Some("yes")),
            (50, "admin", Some("jun"), Some("no")),
            (40, "technician", Some("may"), Some("yes")),
        ]);
        AppState::new(ds, DashboardConfig::default())
    }

    #[test]
    fn starts_with_everything_selected() {
        let state = state();
        assert!(!state.is_dirty());
        assert_eq!(state.snapshot().visible_indices, vec![0, 1, 2]);
        assert_eq!(state.snapshot().summary.average_age, Some(40.0));
        assert_eq!(state.view().len(), 3);
    }

    #[test]
    fn changes_recompute_on_refresh() {
        let mut state = state();
        state.toggle_job("technician");
        assert!(state.is_dirty());
        // Nothing recomputed until refresh.
        assert_eq!(state.snapshot().visible_indices.len(), 3);

        assert!(state.refresh());
        assert_eq!(state.snapshot().visible_indices, vec![0, 1]);
        assert_eq!(state.snapshot().summary.top_job, "admin");
        assert!(!state.refresh());
    }

    #[test]
    fn deselecting_every_job_gives_sentinels() {
        let mut state = state();
        state.select_no_jobs();
        state.refresh();
        let snap = state.snapshot();
        assert!(snap.visible_indices.is_empty());
        assert_eq!(snap.summary.top_job, NOT_AVAILABLE);
        assert_eq!(snap.summary.subscription_rate, SubscriptionRate::NoData);
        assert!(snap.histogram.is_empty());
        assert!(matches!(snap.correlation, Correlation::Matrix(ref m) if !m.has_values()));

        state.select_all_jobs();
        state.refresh();
        assert_eq!(state.snapshot().visible_indices.len(), 3);
    }

    #[test]
    fn age_range_is_clamped_and_ordered() {
        let mut state = state();
        state.set_age_range(45, 10);
        assert_eq!((state.criteria.age_min, state.criteria.age_max), (30, 45));
        state.refresh();
        assert_eq!(state.snapshot().visible_indices, vec![0, 2]);
    }

    #[test]
    fn month_and_sort_controls() {
        let mut state = state();
        state.toggle_month("jun");
        state.toggle_month("dec");
        state.refresh();
        assert_eq!(state.snapshot().visible_indices, vec![0, 2]);

        state.set_sort_mode(SortMode::MostCommon);
        assert!(state.is_dirty());
        state.refresh();
        let counts: Vec<usize> = state.snapshot().job_counts.iter().map(|c| c.1).collect();
        assert_eq!(counts, vec![1, 1]);

        state.reset_filters();
        state.refresh();
        assert_eq!(state.snapshot().visible_indices.len(), 3);
    }

    #[test]
    fn unknown_job_is_ignored() {
        let mut state = state();
        state.toggle_job("astronaut");
        assert!(!state.is_dirty());
        assert!(!state.criteria.jobs.contains("astronaut"));
    }
}
