use std::collections::HashMap;
use std::fmt;

use crate::data::filter::FilteredView;

/// Shown in place of a value that cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

const SUBSCRIBED: &str = "yes";

// ---------------------------------------------------------------------------
// Insight summary
// ---------------------------------------------------------------------------

/// Share of contacts that subscribed to the term deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubscriptionRate {
    /// The dataset has no `y` column.
    NoLabelColumn,
    /// No record in the view carries a label.
    NoData,
    /// Percentage in `[0, 100]`.
    Percent(f64),
}

impl SubscriptionRate {
    pub fn percent(&self) -> Option<f64> {
        match self {
            SubscriptionRate::Percent(p) => Some(*p),
            _ => None,
        }
    }
}

/// Scalar highlights over a filtered view.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightSummary {
    /// Mean age; `None` for an empty view.
    pub average_age: Option<f64>,
    /// Most frequent job, or [`NOT_AVAILABLE`] for an empty view.
    pub top_job: String,
    pub subscription_rate: SubscriptionRate,
}

/// Compute the insight highlights for a view.  Never panics on an empty view.
///
/// When several jobs share the highest frequency the lexicographically
/// smallest one wins.  Callers should not rely on which tied job is reported.
///
/// The subscription rate is taken over records that carry a label; records
/// with an empty `y` cell do not count towards the denominator.
pub fn summarize(view: &FilteredView<'_>) -> InsightSummary {
    let average_age = if view.is_empty() {
        None
    } else {
        let total: f64 = view.records().map(|r| r.age as f64).sum();
        Some(total / view.len() as f64)
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in view.records() {
        *counts.entry(record.job.as_str()).or_default() += 1;
    }
    let top_job = counts
        .into_iter()
        .max_by(|(job_a, n_a), (job_b, n_b)| n_a.cmp(n_b).then_with(|| job_b.cmp(job_a)))
        .map_or_else(|| NOT_AVAILABLE.to_string(), |(job, _)| job.to_string());

    let subscription_rate = if !view.dataset().has_label {
        SubscriptionRate::NoLabelColumn
    } else {
        let (labelled, yes) = view
            .records()
            .filter_map(|r| r.label.as_deref())
            .fold((0usize, 0usize), |(n, yes), label| {
                (n + 1, yes + usize::from(label == SUBSCRIBED))
            });
        if labelled == 0 {
            SubscriptionRate::NoData
        } else {
            SubscriptionRate::Percent(100.0 * yes as f64 / labelled as f64)
        }
    };

    InsightSummary {
        average_age,
        top_job,
        subscription_rate,
    }
}

/// One highlight per line.  The subscription line is left out when the
/// dataset has no label column.
impl fmt::Display for InsightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average_age {
            Some(age) => write!(f, "Average age of selected customers: {age:.1}")?,
            None => write!(f, "Average age of selected customers: {NOT_AVAILABLE}")?,
        }
        write!(f, "\nMost common job in this customer segment: {}", self.top_job)?;
        if self.subscription_rate == SubscriptionRate::NoLabelColumn {
            return Ok(());
        }
        match self.subscription_rate.percent() {
            Some(p) => write!(f, "\nEstimated subscription likelihood (term deposit): {p:.2}%"),
            None => write!(
                f,
                "\nEstimated subscription likelihood (term deposit): {NOT_AVAILABLE}"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::filter::{apply, FilterCriteria};
    use crate::data::model::tests::dataset;

    #[test]
    fn three_record_scenario() {
        let ds = dataset(&[
            (30, "admin", None, Some("yes")),
            (50, "admin", None, Some("no")),
            (40, "technician", None, Some("yes")),
        ]);
        let indices = apply(&ds, &FilterCriteria::everything(&ds));
        let summary = summarize(&FilteredView::new(&ds, &indices));

        assert_eq!(summary.average_age, Some(40.0));
        assert_eq!(summary.top_job, "admin");
        let rate = summary.subscription_rate.percent().unwrap();
        assert!((rate - 66.666_666).abs() < 1e-4);
        assert_eq!(format!("{rate:.2}"), "66.67");
    }

    #[test]
    fn empty_view_yields_sentinels() {
        let ds = dataset(&[(30, "admin", None, Some("yes"))]);
        let criteria = FilterCriteria {
            jobs: BTreeSet::new(),
            ..FilterCriteria::everything(&ds)
        };
        let indices = apply(&ds, &criteria);
        let summary = summarize(&FilteredView::new(&ds, &indices));

        assert_eq!(summary.average_age, None);
        assert_eq!(summary.top_job, NOT_AVAILABLE);
        assert_eq!(summary.subscription_rate, SubscriptionRate::NoData);
        let text = summary.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().all(|line| line.ends_with("N/A")));
    }

    #[test]
    fn missing_label_column_is_never_rated() {
        let ds = dataset(&[(30, "admin", None, None), (41, "services", None, None)]);
        assert!(!ds.has_label);
        for indices in [vec![], vec![0], vec![0, 1]] {
            let summary = summarize(&FilteredView::new(&ds, &indices));
            assert_eq!(summary.subscription_rate, SubscriptionRate::NoLabelColumn);
            assert_eq!(summary.to_string().lines().count(), 2);
        }
    }

    #[test]
    fn unlabelled_records_are_left_out_of_the_rate() {
        let ds = dataset(&[
            (30, "admin", None, Some("yes")),
            (31, "admin", None, None),
            (32, "admin", None, Some("no")),
        ]);
        let indices = vec![0, 1, 2];
        let summary = summarize(&FilteredView::new(&ds, &indices));
        assert_eq!(summary.subscription_rate, SubscriptionRate::Percent(50.0));
    }

    #[test]
    fn tied_top_job_is_one_of_the_maximal_jobs() {
        let ds = dataset(&[
            (30, "technician", None, None),
            (31, "admin", None, None),
            (32, "technician", None, None),
            (33, "admin", None, None),
            (34, "student", None, None),
        ]);
        let indices: Vec<usize> = (0..ds.len()).collect();
        let summary = summarize(&FilteredView::new(&ds, &indices));
        assert!(["admin", "technician"].contains(&summary.top_job.as_str()));
    }
}
