//! Chart-ready series derived from a filtered view.
//!
//! Nothing here draws; `ui::charts` hands these series to `egui_plot`.

use std::collections::{BTreeMap, HashMap};

use crate::data::filter::FilteredView;

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

// ---------------------------------------------------------------------------
// Job distribution (pie chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDistribution {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl JobDistribution {
    /// Fraction of the view held by a job, in `[0, 1]`.
    pub fn share(&self, job: &str) -> f64 {
        match (self.counts.get(job), self.total) {
            (Some(&n), total) if total > 0 => n as f64 / total as f64,
            _ => 0.0,
        }
    }
}

pub fn job_distribution(view: &FilteredView<'_>) -> JobDistribution {
    let mut counts = BTreeMap::new();
    for record in view.records() {
        *counts.entry(record.job.clone()).or_default() += 1;
    }
    JobDistribution {
        counts,
        total: view.len(),
    }
}

// ---------------------------------------------------------------------------
// Age histogram (one series per job)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AgeHistogram {
    /// Left edge of the first bucket.
    pub start: f64,
    pub bucket_width: f64,
    pub bins: usize,
    /// Bucket counts per job; every vector has `bins` entries.
    pub series: BTreeMap<String, Vec<usize>>,
}

impl AgeHistogram {
    /// Centre of bucket `i`, for bar placement.
    pub fn bucket_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bucket_width
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Bucket ages into `bins` equal-width buckets spanning the view's observed
/// age range.  The last bucket is closed so the oldest contact is counted.
/// When every age is equal the buckets are one year wide.
pub fn age_histogram(view: &FilteredView<'_>, bins: usize) -> AgeHistogram {
    let bins = bins.max(1);
    let bounds = view.records().fold(None, |acc: Option<(i64, i64)>, r| match acc {
        None => Some((r.age, r.age)),
        Some((lo, hi)) => Some((lo.min(r.age), hi.max(r.age))),
    });

    let Some((lo, hi)) = bounds else {
        return AgeHistogram {
            start: 0.0,
            bucket_width: 1.0,
            bins,
            series: BTreeMap::new(),
        };
    };

    let start = lo as f64;
    // Full i64 range fits in u64, and u64 * usize fits in u128.
    let span = hi.abs_diff(lo);
    let bucket_width = if span > 0 {
        span as f64 / bins as f64
    } else {
        1.0
    };

    let mut series: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for record in view.records() {
        let bucket = if span > 0 {
            let offset = record.age.abs_diff(lo) as u128 * bins as u128 / span as u128;
            offset.min(bins as u128 - 1) as usize
        } else {
            0
        };
        series
            .entry(record.job.clone())
            .or_insert_with(|| vec![0; bins])[bucket] += 1;
    }

    AgeHistogram {
        start,
        bucket_width,
        bins,
        series,
    }
}

// ---------------------------------------------------------------------------
// Job counts (bar chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Alphabetical,
    MostCommon,
}

impl SortMode {
    pub fn label(self) -> &'static str {
        match self {
            SortMode::Alphabetical => "Alphabetical",
            SortMode::MostCommon => "Most Common",
        }
    }
}

/// Per-job counts ordered for the bar chart.
///
/// `MostCommon` keeps jobs with equal counts in the order they first appear
/// in the view.
pub fn job_counts(view: &FilteredView<'_>, mode: SortMode) -> Vec<(String, usize)> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in view.records() {
        match position.get(record.job.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(record.job.as_str(), counts.len());
                counts.push((record.job.clone(), 1));
            }
        }
    }

    match mode {
        SortMode::Alphabetical => counts.sort_by(|a, b| a.0.cmp(&b.0)),
        // Stable sort: ties stay in first-seen order.
        SortMode::MostCommon => counts.sort_by(|a, b| b.1.cmp(&a.1)),
    }
    counts
}

// ---------------------------------------------------------------------------
// Correlation matrix (heatmap)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major `columns.len() × columns.len()` Pearson coefficients.
    /// `NaN` where a coefficient is undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    /// Whether at least one off-diagonal or diagonal entry is defined.
    pub fn has_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_nan())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Correlation {
    /// The dataset has no numeric column; render a warning instead.
    Unavailable,
    Matrix(CorrelationMatrix),
}

/// Pearson correlation between every pair of numeric columns, using the rows
/// of the view where both cells are present.
pub fn correlation_matrix(view: &FilteredView<'_>) -> Correlation {
    let numeric = view.dataset().numeric_columns();
    if numeric.is_empty() {
        return Correlation::Unavailable;
    }

    let columns: Vec<Vec<Option<f64>>> = numeric
        .iter()
        .map(|&(idx, _)| {
            view.records()
                .map(|r| r.values.get(idx).and_then(|v| v.as_f64()))
                .collect()
        })
        .collect();

    let n = numeric.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    Correlation::Matrix(CorrelationMatrix {
        columns: numeric.iter().map(|&(_, name)| name.to_string()).collect(),
        values,
    })
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
