//! Cleaning steps that turn a raw listing table into an analysis-ready one.
//!
//! Every step is tolerant: a named column the dataset does not have is
//! skipped rather than reported, so sources with different column sets all
//! flow through the same pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cache::{DatasetCache, Source};
use super::filter::filter_by_group_minimum;
use super::model::{Dataset, Value};
use super::schema;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Which columns each step touches, and the optional group threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    /// Rows with a null in any of these are dropped.
    pub required_columns: Vec<String>,
    /// Column whose rare values are filtered out.
    pub group_column: String,
    /// Minimum rows a group needs to survive; 0 disables the filter.
    pub min_group_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            numeric_columns: to_owned(&schema::NUMERIC_COLUMNS),
            categorical_columns: to_owned(&schema::CATEGORICAL_COLUMNS),
            required_columns: vec![schema::PRICE.to_string()],
            group_column: schema::MANUFACTURER.to_string(),
            min_group_count: 0,
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Replace nulls with `"unknown"` in every named column present.
pub fn normalize_categorical<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Dataset {
    dataset.map_columns(columns, |v| match v {
        Value::Null => Value::String(schema::UNKNOWN.to_string()),
        other => other.clone(),
    })
}

/// Turn every value of each named column present into `Float` or `Null`.
/// Unparsable text and non-finite numbers become `Null`.
pub fn coerce_numeric<S: AsRef<str>>(dataset: &Dataset, columns: &[S]) -> Dataset {
    dataset.map_columns(columns, to_numeric)
}

fn to_numeric(value: &Value) -> Value {
    let parsed = match value {
        Value::Null => None,
        Value::Integer(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok(),
    };
    match parsed {
        Some(f) if f.is_finite() => Value::Float(f),
        _ => Value::Null,
    }
}

/// Remove rows holding a null in any required column.  Required columns the
/// dataset lacks impose no constraint.
pub fn drop_incomplete<S: AsRef<str>>(dataset: &Dataset, required: &[S]) -> Dataset {
    let mut indices = Vec::with_capacity(required.len());
    for col in required {
        match dataset.column_index(col.as_ref()) {
            Some(idx) => indices.push(idx),
            None => log::warn!("required column '{}' is absent; not enforced", col.as_ref()),
        }
    }
    dataset.filter_records(|rec| indices.iter().all(|&i| !rec[i].is_null()))
}

/// Run the full preparation: coerce numerics, fill categorical nulls, drop
/// incomplete rows, then filter rare groups when a threshold is set.
pub fn prepare(dataset: &Dataset, config: &PipelineConfig) -> Dataset {
    let coerced = coerce_numeric(dataset, &config.numeric_columns);
    let normalized = normalize_categorical(&coerced, &config.categorical_columns);
    let complete = drop_incomplete(&normalized, &config.required_columns);
    log::debug!(
        "dropped {} incomplete rows ({} remain)",
        dataset.len() - complete.len(),
        complete.len()
    );

    let filtered = filter_by_group_minimum(&complete, &config.group_column, config.min_group_count);
    if filtered.len() != complete.len() {
        log::debug!(
            "group filter on '{}' (min {}) kept {} of {} rows",
            config.group_column,
            config.min_group_count,
            filtered.len(),
            complete.len()
        );
    }
    filtered
}

/// Pipeline entry point: fetch `source` through `cache` (re-reading it once
/// `ttl` has passed) and prepare a fresh view of it.  The cached dataset
/// itself is never modified.
pub fn load_prepared(
    cache: &mut DatasetCache,
    source: &Source,
    ttl: Duration,
    config: &PipelineConfig,
) -> Result<Dataset> {
    let raw = cache.get_or_load(source, ttl)?;
    Ok(prepare(&raw, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{FUEL, MANUFACTURER, PRICE, TYPE};

    fn listings() -> Dataset {
        Dataset::new(
            vec![PRICE.into(), "odometer".into(), TYPE.into(), MANUFACTURER.into()],
            vec![
                vec![Value::Integer(9400), Value::Float(145000.0), "SUV".into(), Value::Null],
                vec![Value::Null, "abc".into(), Value::Null, "ford".into()],
                vec!["".into(), Value::Integer(88000), "sedan".into(), "ford".into()],
                vec!["12 ".into(), Value::Null, Value::Null, "audi".into()],
            ],
        )
    }

    #[test]
    fn normalize_fills_nulls_with_unknown() {
        let ds = normalize_categorical(&listings(), &[TYPE, MANUFACTURER]);
        for col in [TYPE, MANUFACTURER] {
            assert!(ds.column(col).unwrap().all(|v| !v.is_null()));
        }
        assert_eq!(ds.value(1, TYPE), Some(&Value::from("unknown")));
        assert_eq!(ds.value(0, TYPE), Some(&Value::from("SUV")));
    }

    #[test]
    fn normalize_skips_absent_columns() {
        let ds = normalize_categorical(&listings(), &[FUEL, TYPE]);
        assert!(!ds.has_column(FUEL));
        assert_eq!(ds.value(3, TYPE), Some(&Value::from("unknown")));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_categorical(&listings(), &[TYPE, MANUFACTURER]);
        let twice = normalize_categorical(&once, &[TYPE, MANUFACTURER]);
        assert_eq!(once, twice);
    }

    #[test]
    fn coerce_yields_only_floats_or_nulls() {
        let ds = coerce_numeric(&listings(), &[PRICE, "odometer", "cylinders"]);
        for col in [PRICE, "odometer"] {
            assert!(ds
                .column(col)
                .unwrap()
                .all(|v| matches!(v, Value::Float(_) | Value::Null)));
        }
        assert_eq!(ds.value(1, "odometer"), Some(&Value::Null));
        assert_eq!(ds.value(3, PRICE), Some(&Value::Float(12.0)));
        assert!(!ds.has_column("cylinders"));
    }

    #[test]
    fn coerce_maps_non_finite_to_null() {
        let ds = Dataset::new(
            vec![PRICE.into()],
            vec![vec!["inf".into()], vec![Value::Float(f64::NAN)], vec![Value::Bool(true)]],
        );
        let ds = coerce_numeric(&ds, &[PRICE]);
        assert_eq!(ds.value(0, PRICE), Some(&Value::Null));
        assert_eq!(ds.value(1, PRICE), Some(&Value::Null));
        assert_eq!(ds.value(2, PRICE), Some(&Value::Float(1.0)));
    }

    #[test]
    fn empty_price_row_is_dropped() {
        let ds = coerce_numeric(&listings(), &[PRICE]);
        let ds = drop_incomplete(&ds, &[PRICE]);
        assert_eq!(ds.len(), 2);
        assert!(ds.column(PRICE).unwrap().all(|v| !v.is_null()));
    }

    #[test]
    fn drop_incomplete_can_require_manufacturer() {
        let ds = drop_incomplete(&listings(), &[PRICE, MANUFACTURER]);
        // Row 0 lacks a manufacturer, row 1 a price; row 2 holds "" which
        // only becomes null once coerced.
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn drop_incomplete_ignores_absent_required_columns() {
        let ds = drop_incomplete(&listings(), &["days_listed"]);
        assert_eq!(ds.len(), listings().len());
    }

    #[test]
    fn prepare_enforces_price_and_fills_categoricals() {
        let ds = prepare(&listings(), &PipelineConfig::default());
        assert_eq!(ds.len(), 2);
        assert!(ds.column(PRICE).unwrap().all(|v| v.as_f64().is_some()));
        assert!(ds.column(TYPE).unwrap().all(|v| !v.is_null()));
        assert_eq!(ds.value(0, MANUFACTURER), Some(&Value::from("unknown")));
    }

    #[test]
    fn prepare_applies_group_threshold() {
        let config = PipelineConfig {
            min_group_count: 2,
            ..PipelineConfig::default()
        };
        let raw = Dataset::new(
            vec![PRICE.into(), MANUFACTURER.into()],
            vec![
                vec![Value::Integer(1), "ford".into()],
                vec![Value::Integer(2), "ford".into()],
                vec![Value::Integer(3), "audi".into()],
            ],
        );
        let ds = prepare(&raw, &config);
        assert_eq!(ds.len(), 2);
        assert!(ds
            .column(MANUFACTURER)
            .unwrap()
            .all(|v| v == &Value::from("ford")));
    }

    #[test]
    fn load_prepared_leaves_cached_copy_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vehicles.csv");
        std::fs::write(&path, "price,type\n100,\n,sedan\n").unwrap();

        let mut cache = DatasetCache::new();
        let source = Source::new(&path);
        let ttl = Duration::from_secs(60);
        let ds = load_prepared(&mut cache, &source, ttl, &PipelineConfig::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.value(0, TYPE), Some(&Value::from("unknown")));

        let raw = cache.get_or_load(&source, ttl).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw.value(0, TYPE), Some(&Value::Null));
    }
}
