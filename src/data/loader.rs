use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record, Value};
use super::schema;
use crate::error::{DataError, Result};

/// Cell texts read as missing, matching what common dataframe tools treat as NA.
const NA_MARKERS: [&str; 13] = [
    "NA", "N/A", "n/a", "#N/A", "<NA>", "NaN", "nan", "-nan", "-NaN", "NULL", "null", "None",
    "#NA",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listing dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row
/// * `.tsv`          – tab-delimited with a header row
/// * `.json`         – `[{ "price": 9400, "type": "sedan", ... }, ...]`
/// * `.parquet`      – flat columns of strings, ints, floats, bools
///
/// `delimiter` overrides the separator for the delimited formats and makes
/// any unknown extension readable as delimited text.
///
/// Fails with [`DataError::SourceUnavailable`] when the file cannot be opened
/// or read through, and with [`DataError::SchemaMismatch`] when not a single
/// expected column is present.  Partial schemas load fine.
pub fn load_file(path: &Path, delimiter: Option<u8>) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let started = Instant::now();
    let dataset = match (ext.as_str(), delimiter) {
        ("parquet" | "pq", _) => load_parquet(path)?,
        ("json", _) => load_json(path)?,
        ("tsv", None) => load_delimited(path, b'\t')?,
        ("csv" | "txt", None) => load_delimited(path, b',')?,
        (_, Some(delim)) => load_delimited(path, delim)?,
        (other, None) => return Err(DataError::UnsupportedFormat(other.to_string())),
    };

    check_schema(path, &dataset)?;
    log::info!(
        "Loaded {} listings with {} columns from {} in {:?}",
        dataset.len(),
        dataset.columns().len(),
        path.display(),
        started.elapsed()
    );
    Ok(dataset)
}

fn check_schema(path: &Path, dataset: &Dataset) -> Result<()> {
    if dataset.columns().iter().any(|c| schema::is_expected(c)) {
        return Ok(());
    }
    Err(DataError::SchemaMismatch {
        path: path.to_path_buf(),
        found: dataset.columns().to_vec(),
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one listing per line.  Ragged lines are
/// accepted; missing trailing cells become `Null`.  Bytes that are not valid
/// UTF-8 are replaced rather than failing the file.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::unavailable(path, e))?;

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| DataError::unavailable(path, format!("reading header: {e}")))?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record =
            result.map_err(|e| DataError::unavailable(path, format!("row {row_no}: {e}")))?;
        records.push(
            record
                .iter()
                .map(|field| infer_value(&String::from_utf8_lossy(field)))
                .collect::<Record>(),
        );
    }

    Ok(Dataset::new(headers, records))
}

/// Type a raw text cell by inspection.
pub fn infer_value(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() || NA_MARKERS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "price": 9400, "model_year": 2011, "type": "SUV", "fuel": null },
///   ...
/// ]
/// ```
///
/// The column set is the union of keys over all records.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::unavailable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DataError::unavailable(path, format!("parsing JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| DataError::unavailable(path, "expected top-level JSON array"))?;

    let mut columns: Vec<String> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| DataError::unavailable(path, format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
    }

    let records = rows
        .iter()
        .filter_map(|row| row.as_object())
        .map(|obj| {
            let mut rec = vec![Value::Null; columns.len()];
            for (key, val) in obj {
                rec[index[key]] = json_to_value(val);
            }
            rec
        })
        .collect();

    Ok(Dataset::new(columns, records))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => infer_value(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of listings.  Every column is read; nested types are
/// rendered as their Arrow type name.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(|e| DataError::unavailable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::unavailable(path, format!("reading parquet metadata: {e}")))?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| DataError::unavailable(path, format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::unavailable(path, format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            let rec = batch
                .columns()
                .iter()
                .map(|col| extract_value(col, row))
                .collect::<Record>();
            records.push(rec);
        }
    }

    Ok(Dataset::new(columns, records))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => infer_string(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => infer_string(col.as_string::<i64>().value(row)),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => Value::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        other => Value::String(format!("{other:?}")),
    }
}

/// String columns keep their text; only NA markers are mapped to `Null`.
fn infer_string(s: &str) -> Value {
    if s.trim().is_empty() || NA_MARKERS.contains(&s.trim()) {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int32Array, StringArray, UInt64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_with(suffix: &str, contents: &str) -> NamedTempFile {
        temp_with_bytes(suffix, contents.as_bytes())
    }

    fn temp_with_bytes(suffix: &str, contents: &[u8]) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn infers_cell_types() {
        assert_eq!(infer_value(""), Value::Null);
        assert_eq!(infer_value("  "), Value::Null);
        assert_eq!(infer_value("NaN"), Value::Null);
        assert_eq!(infer_value("2011"), Value::Integer(2011));
        assert_eq!(infer_value("4.5"), Value::Float(4.5));
        assert_eq!(infer_value("True"), Value::Bool(true));
        assert_eq!(infer_value(" ford "), Value::from("ford"));
    }

    #[test]
    fn loads_csv_with_partial_schema() {
        let file = temp_with(
            ".csv",
            "price,model_year,type,extra\n9400,2011,SUV,x\n,2013,,y\n25500,,pickup\n",
        );
        let ds = load_file(file.path(), None).unwrap();
        assert_eq!(ds.columns(), &["price", "model_year", "type", "extra"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.value(1, "price"), Some(&Value::Null));
        assert_eq!(ds.value(2, "extra"), Some(&Value::Null));
        assert_eq!(ds.value(0, "type"), Some(&Value::from("SUV")));
    }

    #[test]
    fn honours_delimiter_override() {
        let file = temp_with(".dat", "price;fuel\n100;gas\n");
        let ds = load_file(file.path(), Some(b';')).unwrap();
        assert_eq!(ds.value(0, "fuel"), Some(&Value::from("gas")));
    }

    #[test]
    fn loads_tsv_by_extension() {
        let file = temp_with(".tsv", "price\tfuel\n100\tdiesel\n");
        let ds = load_file(file.path(), None).unwrap();
        assert_eq!(ds.value(0, "price"), Some(&Value::Integer(100)));
    }

    #[test]
    fn loads_json_records() {
        let file = temp_with(
            ".json",
            r#"[{"price": 9400, "fuel": "gas"}, {"price": null, "odometer": 1.5}]"#,
        );
        let ds = load_file(file.path(), None).unwrap();
        assert_eq!(ds.len(), 2);
        assert!(ds.has_column("odometer"));
        assert_eq!(ds.value(0, "odometer"), Some(&Value::Null));
        assert_eq!(ds.value(1, "price"), Some(&Value::Null));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = load_file(Path::new("/definitely/not/here/vehicles.csv"), None).unwrap_err();
        assert!(matches!(err, DataError::SourceUnavailable { .. }));
    }

    #[test]
    fn foreign_columns_are_schema_mismatch() {
        let file = temp_with(".csv", "a,b\n1,2\n");
        let err = load_file(file.path(), None).unwrap_err();
        match err {
            DataError::SchemaMismatch { found, .. } => assert_eq!(found, vec!["a", "b"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_extension_without_delimiter_is_rejected() {
        let file = temp_with(".xlsx", "price\n1\n");
        assert!(matches!(
            load_file(file.path(), None),
            Err(DataError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn invalid_utf8_cell_is_replaced_not_fatal() {
        let file = temp_with_bytes(".csv", b"price,fuel\n100,ga\xFFs\n200,diesel\n");
        let ds = load_file(file.path(), None).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(0, "fuel"), Some(&Value::from("ga\u{FFFD}s")));
        assert_eq!(ds.value(1, "price"), Some(&Value::Integer(200)));
    }

    #[test]
    fn loads_parquet_columns_with_nulls() {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Float64Array::from(vec![Some(1.0), None])),
            Arc::new(StringArray::from(vec![None, Some("NA")])),
            Arc::new(StringArray::from(vec![Some("ford"), Some(" ")])),
            Arc::new(Int32Array::from(vec![Some(2011), Some(2013)])),
            Arc::new(UInt64Array::from(vec![Some(3), Some(u64::MAX)])),
            Arc::new(BooleanArray::from(vec![Some(true), None])),
        ];
        let names = ["price", "type", "manufacturer", "model_year", "days_listed", "is_4wd"];
        let fields: Vec<Field> = names
            .iter()
            .zip(&columns)
            .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
            .collect();
        let arrow_schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(arrow_schema.clone(), columns).unwrap();

        let mut file = Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file_mut(), arrow_schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), None).unwrap();
        assert_eq!(ds.columns(), &names);
        assert_eq!(
            ds.records(),
            &[
                vec![
                    Value::Float(1.0),
                    Value::Null,
                    Value::from("ford"),
                    Value::Integer(2011),
                    Value::Integer(3),
                    Value::Bool(true),
                ],
                vec![
                    Value::Null,
                    Value::Null,
                    Value::Null,
                    Value::Integer(2013),
                    Value::Float(u64::MAX as f64),
                    Value::Null,
                ],
            ]
        );
    }
}
