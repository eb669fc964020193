use std::collections::BTreeSet;

use super::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Filter predicate: age range plus job / month selections
// ---------------------------------------------------------------------------

/// The active user selection.
///
/// An empty `jobs` set means "no job is acceptable" and hides everything.
/// `months` is `None` when the month filter is not in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub age_min: i64,
    pub age_max: i64,
    pub jobs: BTreeSet<String>,
    pub months: Option<BTreeSet<String>>,
}

impl FilterCriteria {
    /// Criteria that select everything: full age range and every observed job
    /// and month.  This is the UI's starting point; `apply` imposes no default.
    pub fn everything(dataset: &Dataset) -> Self {
        let (age_min, age_max) = dataset.age_bounds.unwrap_or((0, 0));
        Self {
            age_min,
            age_max,
            jobs: dataset.jobs.clone(),
            months: dataset.months.clone(),
        }
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &Record) -> bool {
        if record.age < self.age_min || record.age > self.age_max {
            return false;
        }
        if !self.jobs.contains(&record.job) {
            return false;
        }
        match (&self.months, &record.month) {
            (None, _) => true,
            (Some(selected), Some(month)) => selected.contains(month),
            (Some(_), None) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// Records of a dataset that pass a [`FilterCriteria`], in dataset order.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, indices: &'a [usize]) -> Self {
        Self { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

impl PartialEq for FilteredView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.dataset, other.dataset) && self.indices == other.indices
    }
}

/// Return indices of records that pass all predicates.
///
/// A record passes when:
/// * its age lies in `[age_min, age_max]` (inclusive)
/// * its job is in the selected set (an empty set selects nothing)
/// * the month filter is off, or its month is in the selected set
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    if criteria.jobs.is_empty() || criteria.age_min > criteria.age_max {
        return Vec::new();
    }
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::tests::dataset;

    fn campaign() -> Dataset {
        dataset(&[
            (30, "admin.", Some("may"), Some("yes")),
            (50, "admin.", Some("jun"), Some("no")),
            (40, "technician", Some("may"), Some("yes")),
            (22, "student", None, Some("no")),
        ])
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn everything_uses_full_domains() {
        let ds = campaign();
        let criteria = FilterCriteria::everything(&ds);
        assert_eq!(criteria.age_min, 22);
        assert_eq!(criteria.age_max, 50);
        // The month filter excludes the record without a month, just like a
        // membership test on a missing value.
        assert_eq!(apply(&ds, &criteria), vec![0, 1, 2]);

        let no_month = FilterCriteria {
            months: None,
            ..criteria
        };
        assert_eq!(apply(&ds, &no_month), vec![0, 1, 2, 3]);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let ds = campaign();
        let criteria = FilterCriteria {
            age_min: 30,
            age_max: 40,
            jobs: ds.jobs.clone(),
            months: None,
        };
        assert_eq!(apply(&ds, &criteria), vec![0, 2]);
    }

    #[test]
    fn empty_job_selection_yields_empty_view() {
        let ds = campaign();
        let criteria = FilterCriteria {
            age_min: i64::MIN,
            age_max: i64::MAX,
            jobs: BTreeSet::new(),
            months: None,
        };
        assert!(apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn inverted_age_range_yields_empty_view() {
        let ds = campaign();
        let criteria = FilterCriteria {
            age_min: 45,
            age_max: 35,
            jobs: ds.jobs.clone(),
            months: None,
        };
        assert!(apply(&ds, &criteria).is_empty());
    }

    #[test]
    fn month_selection_narrows_view() {
        let ds = campaign();
        let criteria = FilterCriteria {
            months: Some(set(&["may"])),
            ..FilterCriteria::everything(&ds)
        };
        assert_eq!(apply(&ds, &criteria), vec![0, 2]);
    }

    #[test]
    fn three_record_scenario_keeps_everything() {
        let ds = dataset(&[
            (30, "admin", None, Some("yes")),
            (50, "admin", None, Some("no")),
            (40, "technician", None, Some("yes")),
        ]);
        let criteria = FilterCriteria {
            age_min: 30,
            age_max: 50,
            jobs: set(&["admin", "technician"]),
            months: None,
        };
        assert_eq!(apply(&ds, &criteria), vec![0, 1, 2]);
    }

    #[test]
    fn views_compare_by_dataset_and_indices() {
        let ds = campaign();
        let a = vec![0, 2];
        let b = vec![0, 2];
        assert_eq!(FilteredView::new(&ds, &a), FilteredView::new(&ds, &b));
        let other = campaign();
        assert_ne!(FilteredView::new(&ds, &a), FilteredView::new(&other, &b));
    }

    const JOB_POOL: [&str; 4] = ["admin.", "blue-collar", "student", "retired"];
    const MONTH_POOL: [&str; 3] = ["may", "jun", "jul"];

    fn arb_rows() -> impl Strategy<Value = Vec<(i64, usize, Option<usize>)>> {
        prop::collection::vec(
            (17i64..=98, 0..JOB_POOL.len(), prop::option::of(0..MONTH_POOL.len())),
            0..60,
        )
    }

    fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
        (
            17i64..=98,
            17i64..=98,
            prop::sample::subsequence(JOB_POOL.to_vec(), 0..=JOB_POOL.len()),
            prop::option::of(prop::sample::subsequence(MONTH_POOL.to_vec(), 0..=MONTH_POOL.len())),
        )
            .prop_map(|(a, b, jobs, months)| FilterCriteria {
                age_min: a.min(b),
                age_max: a.max(b),
                jobs: set(&jobs),
                months: months.map(|m| set(&m)),
            })
    }

    fn build(rows: &[(i64, usize, Option<usize>)]) -> Dataset {
        let rows: Vec<_> = rows
            .iter()
            .map(|&(age, job, month)| (age, JOB_POOL[job], month.map(|m| MONTH_POOL[m]), None::<&str>))
            .collect();
        dataset(&rows)
    }

    proptest! {
        #[test]
        fn view_is_a_sound_and_complete_subset(rows in arb_rows(), criteria in arb_criteria()) {
            let ds = build(&rows);
            let indices = apply(&ds, &criteria);
            prop_assert!(indices.len() <= ds.len());
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));

            for (i, record) in ds.records.iter().enumerate() {
                let included = indices.binary_search(&i).is_ok();
                prop_assert_eq!(included, criteria.matches(record));
            }
        }

        #[test]
        fn apply_is_idempotent(rows in arb_rows(), criteria in arb_criteria()) {
            let ds = build(&rows);
            let first = apply(&ds, &criteria);
            let second = apply(&ds, &criteria);
            prop_assert_eq!(FilteredView::new(&ds, &first), FilteredView::new(&ds, &second));
        }
    }
}
