use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the campaign table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value, guessed from the raw field text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw field: integer, then float, else text.
    /// Empty fields become `Null`.
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        CellValue::Text(s.to_string())
    }

    /// Numeric view of the cell, used by the correlation matrix.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one customer contact
// ---------------------------------------------------------------------------

/// One row of the campaign table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub age: i64,
    pub job: String,
    /// Campaign month, when the dataset has a `month` column.
    pub month: Option<String>,
    /// Outcome label (`y`), "yes" or "no".
    pub label: Option<String>,
    /// Every cell of the row in header order, including the ones above.
    pub values: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

pub const AGE_COLUMN: &str = "age";
pub const JOB_COLUMN: &str = "job";
pub const MONTH_COLUMN: &str = "month";
pub const LABEL_COLUMN: &str = "y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// The full parsed dataset with pre-computed column metadata.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Trimmed column names in header order.
    pub columns: Vec<String>,
    /// Kind of each column, aligned with `columns`.
    pub kinds: Vec<ColumnKind>,
    /// Distinct job values, sorted.
    pub jobs: BTreeSet<String>,
    /// Distinct month values, sorted. `None` when there is no `month` column.
    pub months: Option<BTreeSet<String>>,
    /// Whether the `y` outcome column exists.
    pub has_label: bool,
    /// Observed (min, max) age. `None` for an empty dataset.
    pub age_bounds: Option<(i64, i64)>,
}

impl Dataset {
    /// Build column metadata from the loaded records.
    ///
    /// A column is numeric when at least one cell is non-null and every non-null
    /// cell is a number.
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        let kinds = (0..columns.len())
            .map(|col| {
                let mut seen = false;
                let all_numeric = records.iter().all(|r| match r.values.get(col) {
                    Some(CellValue::Integer(_)) | Some(CellValue::Float(_)) => {
                        seen = true;
                        true
                    }
                    Some(CellValue::Null) | None => true,
                    Some(CellValue::Text(_)) => false,
                });
                if all_numeric && seen {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                }
            })
            .collect();

        let jobs = records.iter().map(|r| r.job.clone()).collect();
        let months = columns.iter().any(|c| c == MONTH_COLUMN).then(|| {
            records
                .iter()
                .filter_map(|r| r.month.clone())
                .collect::<BTreeSet<String>>()
        });
        let has_label = columns.iter().any(|c| c == LABEL_COLUMN);
        let age_bounds = records.iter().fold(None, |acc, r| match acc {
            None => Some((r.age, r.age)),
            Some((lo, hi)) => Some((r.age.min(lo), r.age.max(hi))),
        });

        Dataset {
            records,
            columns,
            kinds,
            jobs,
            months,
            has_label,
            age_bounds,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Indices and names of the numeric columns, in header order.
    pub fn numeric_columns(&self) -> Vec<(usize, &str)> {
        self.columns
            .iter()
            .zip(&self.kinds)
            .enumerate()
            .filter(|(_, (_, kind))| **kind == ColumnKind::Numeric)
            .map(|(i, (name, _))| (i, name.as_str()))
            .collect()
    }
}
