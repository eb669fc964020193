use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    CellValue, Dataset, Record, AGE_COLUMN, JOB_COLUMN, LABEL_COLUMN, MONTH_COLUMN,
};

// ---------------------------------------------------------------------------
// Errors and options
// ---------------------------------------------------------------------------

/// Anything that prevents the dataset from loading. Always fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet file: {0}")]
    Parquet(String),

    #[error("row {row}: expected {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: age '{value}' is not an integer")]
    InvalidAge { row: usize, value: String },

    #[error("row {row}: empty value in required column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumn { column: String, data_type: String },
}

impl From<parquet::errors::ParquetError> for LoadError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        LoadError::Parquet(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for LoadError {
    fn from(e: arrow::error::ArrowError) -> Self {
        LoadError::Parquet(e.to_string())
    }
}

/// Text encoding of a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// ISO-8859-1: every byte is the code point of the same value.
    #[default]
    #[serde(alias = "latin-1", alias = "iso-8859-1")]
    Latin1,
    /// UTF-8; invalid sequences are replaced rather than rejected.
    #[serde(alias = "utf-8")]
    Utf8,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

/// How to read a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: Encoding,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: Encoding::Latin1,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the campaign dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – flat Parquet file with scalar columns
/// * `.json`            – `[{ "age": 30, "job": "admin.", ... }, ...]`
/// * anything else      – delimited text with a header row (`options` apply)
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (columns, rows) = match ext.as_str() {
        "parquet" | "pq" => read_parquet(path)?,
        "json" => read_json(path)?,
        _ => read_delimited(path, options)?,
    };
    let dataset = build_dataset(columns, rows)?;

    log::info!(
        "Loaded {} records with columns {:?} from {}",
        dataset.len(),
        dataset.columns,
        path.display()
    );
    Ok(dataset)
}

/// Decoded field text, `None` for a null cell.  Kept verbatim so categorical
/// columns compare exactly; typing happens in `build_dataset`.
type RawCell = Option<String>;
type RawTable = (Vec<String>, Vec<Vec<RawCell>>);

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> LoadError + '_ {
    move |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line.  Column names are
/// trimmed; every row must have as many fields as the header.
fn read_delimited(path: &Path, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    read_delimited_from(file, options)
}

fn read_delimited_from<R: std::io::Read>(
    input: R,
    options: &LoadOptions,
) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| options.encoding.decode(h).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result?;
        if record.len() != columns.len() {
            return Err(LoadError::FieldCount {
                row: row_no + 1,
                expected: columns.len(),
                found: record.len(),
            });
        }
        let cells = record
            .iter()
            .map(|field| Some(options.encoding.decode(field)))
            .collect();
        rows.push(cells);
    }

    Ok((columns, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).  Keys missing from a
/// record are treated as empty cells.
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(io_error(path))?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<RawTable, LoadError> {
    let objects: Vec<BTreeMap<String, JsonValue>> = serde_json::from_str(text)?;

    let mut columns: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            let key = key.trim();
            if !columns.iter().any(|c| c == key) {
                columns.push(key.to_string());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            let trimmed: BTreeMap<&str, &JsonValue> =
                obj.iter().map(|(k, v)| (k.trim(), v)).collect();
            columns
                .iter()
                .map(|col| trimmed.get(col.as_str()).and_then(|v| json_to_cell(v)))
                .collect()
        })
        .collect();

    Ok((columns, rows))
}

fn json_to_cell(val: &JsonValue) -> RawCell {
    match val {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file (as written by `df.to_parquet()`).  Every column
/// must be castable to text; list and struct columns are rejected.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(io_error(path))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().trim().to_string())
        .collect();
    for field in builder.schema().fields() {
        if !arrow::compute::can_cast_types(field.data_type(), &DataType::Utf8) {
            return Err(LoadError::UnsupportedColumn {
                column: field.name().clone(),
                data_type: format!("{:?}", field.data_type()),
            });
        }
    }

    let reader = builder.build()?;
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let text_columns = batch
            .columns()
            .iter()
            .map(|col| arrow::compute::cast(col, &DataType::Utf8))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let cells = text_columns
                .iter()
                .map(|col| {
                    if col.is_null(row) {
                        return None;
                    }
                    col.as_string_opt::<i32>().map(|s| s.value(row).to_string())
                })
                .collect();
            rows.push(cells);
        }
    }

    Ok((columns, rows))
}

// ---------------------------------------------------------------------------
// Raw table → Dataset
// ---------------------------------------------------------------------------

/// Type the cells and pull out the fields the dashboard filters on.
///
/// `job`, `month` and `y` are taken from the raw text, untrimmed, so values
/// such as `"01"` and `"1"` stay distinct.  An empty cell there counts as
/// missing.
fn build_dataset(columns: Vec<String>, rows: Vec<Vec<RawCell>>) -> Result<Dataset, LoadError> {
    let find = |name: &str| columns.iter().position(|c| c == name);
    let age_idx = find(AGE_COLUMN).ok_or(LoadError::MissingColumn(AGE_COLUMN))?;
    let job_idx = find(JOB_COLUMN).ok_or(LoadError::MissingColumn(JOB_COLUMN))?;
    let month_idx = find(MONTH_COLUMN);
    let label_idx = find(LABEL_COLUMN);

    let mut records = Vec::with_capacity(rows.len());
    let category = |raw: &RawCell| raw.as_ref().filter(|s| !s.is_empty()).cloned();

    for (i, raw) in rows.into_iter().enumerate() {
        let row = i + 1;
        let values: Vec<CellValue> = raw
            .iter()
            .map(|cell| cell.as_deref().map_or(CellValue::Null, CellValue::guess))
            .collect();
        let age = match &values[age_idx] {
            CellValue::Integer(a) => *a,
            CellValue::Float(f) if f.fract() == 0.0 => *f as i64,
            other => {
                return Err(LoadError::InvalidAge {
                    row,
                    value: other.to_string(),
                })
            }
        };
        let job = category(&raw[job_idx]).ok_or(LoadError::MissingValue {
            row,
            column: JOB_COLUMN,
        })?;
        let month = month_idx.and_then(|idx| category(&raw[idx]));
        let label = label_idx.and_then(|idx| category(&raw[idx]));

        records.push(Record {
            age,
            job,
            month,
            label,
            values,
        });
    }

    Ok(Dataset::from_records(columns, records))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const BANK_SAMPLE: &str = "\
\"age\";\"job\";\"marital\";\"month\";\"duration\";\"y\"
56;\"housemaid\";\"married\";\"may\";261;\"no\"
57;\"services\";\"married\";\"may\";149;\"no\"
37;\"services\";\"married\";\"jun\";226;\"yes\"
";

    fn write_temp(suffix: &str, bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn loads_semicolon_file() {
        let file = write_temp(".csv", BANK_SAMPLE.as_bytes());
        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.columns, vec!["age", "job", "marital", "month", "duration", "y"]);
        assert_eq!(ds.records[0].age, 56);
        assert_eq!(ds.records[0].job, "housemaid");
        assert_eq!(ds.records[2].month.as_deref(), Some("jun"));
        assert_eq!(ds.records[2].label.as_deref(), Some("yes"));
        assert!(ds.has_label);
        assert_eq!(ds.age_bounds, Some((37, 57)));
    }

    #[test]
    fn trims_column_names() {
        let file = write_temp(".csv", b" age ;job  ; y\n30;admin.;no\n");
        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.columns, vec!["age", "job", "y"]);
        assert!(ds.has_label);
        assert!(ds.months.is_none());
    }

    #[test]
    fn decodes_latin1() {
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8.
        let file = write_temp(".csv", b"age;job\n41;gest\xE9o\n");
        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.records[0].job, "gestéo");
    }

    #[test]
    fn honours_delimiter_and_encoding_options() {
        let options = LoadOptions {
            delimiter: b',',
            encoding: Encoding::Utf8,
        };
        let (columns, rows) = read_delimited_from("age,job\n30,caf\u{e9}\n".as_bytes(), &options).unwrap();
        assert_eq!(columns, vec!["age", "job"]);
        assert_eq!(rows[0][1].as_deref(), Some("café"));
    }

    #[test]
    fn rejects_field_count_mismatch() {
        let file = write_temp(".csv", b"age;job;y\n30;admin.;no\n31;admin.\n");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldCount {
                row: 2,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn rejects_missing_file() {
        let err = load_file(Path::new("/definitely/not/here.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn rejects_missing_required_columns() {
        let file = write_temp(".csv", b"age;marital\n30;single\n");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("job")));
    }

    #[test]
    fn rejects_non_integer_age() {
        let file = write_temp(".csv", b"age;job\nthirty;admin.\n");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidAge { row: 1, .. }));
    }

    #[test]
    fn keeps_categorical_values_verbatim() {
        let (columns, rows) = read_delimited_from(
            "age;job;y\n30;01;yes\n31;1;no\n32;admin;no\n33; admin;no\n34;nan;\n".as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap();
        let ds = build_dataset(columns, rows).unwrap();

        let jobs: Vec<&str> = ds.records.iter().map(|r| r.job.as_str()).collect();
        assert_eq!(jobs, vec!["01", "1", "admin", " admin", "nan"]);
        assert_eq!(ds.jobs.len(), 5);
        assert_eq!(ds.records[4].label, None);
        // Typed cells are still guessed for the preview and correlation.
        assert_eq!(ds.records[0].values[1], CellValue::Integer(1));
    }

    #[test]
    fn rejects_empty_job() {
        let file = write_temp(".csv", b"age;job\n30;admin.\n31;\n");
        let err = load_file(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingValue {
                row: 2,
                column: "job"
            }
        ));
    }

    #[test]
    fn loads_json_records() {
        let file = write_temp(
            ".json",
            br#"[{"age": 30, "job": "admin.", "y": "yes"}, {"age": 41.0, "job": "technician"}]"#,
        );
        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].age, 41);
        assert_eq!(ds.records[1].label, None);
        assert!(ds.has_label);
    }

    #[test]
    fn loads_parquet_file() {
        use std::sync::Arc;

        use arrow::array::{Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("age", DataType::Int64, false),
            Field::new("job", DataType::Utf8, false),
            Field::new("y", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![25, 60])),
                Arc::new(StringArray::from(vec!["student", "retired"])),
                Arc::new(StringArray::from(vec![Some("no"), None])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(std::fs::File::create(file.path()).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].age, 25);
        assert_eq!(ds.records[1].job, "retired");
        assert_eq!(ds.records[1].label, None);
        assert_eq!(ds.numeric_columns().len(), 1);
    }
}
