use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell of a listing
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a listing file yields.
/// Values key `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
///
/// Floats compare on a canonical key: `-0.0` equals `0.0` and every NaN
/// equals every other NaN.  `PartialEq`, `Ord` and `Hash` all agree on it.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Collapse the float encodings that denote the same value.
fn canonical(f: f64) -> f64 {
    if f.is_nan() {
        f64::NAN
    } else if f == 0.0 {
        0.0
    } else {
        f
    }
}

// -- Manual Eq/Ord/Hash so we can put Value in BTreeSet --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical(*a).total_cmp(&canonical(*b)),
            // Mixed numerics compare by magnitude; an Integer never equals a
            // Float, ties put the Integer first.
            (Integer(a), Float(b)) => canonical(*a as f64)
                .total_cmp(&canonical(*b))
                .then(Ordering::Less),
            (Float(a), Integer(b)) => canonical(*a)
                .total_cmp(&canonical(*b as f64))
                .then(Ordering::Greater),
            (String(a), String(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => canonical(*f).to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as an `f64` for charting.  Non-finite floats count
    /// as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if v.is_finite() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the loaded table of vehicle listings
// ---------------------------------------------------------------------------

/// One row of the source file, aligned with [`Dataset::columns`].
pub type Record = Vec<Value>;

/// An immutable table of listings over a fixed column schema.
///
/// Row order is the source-file order.  Every transform returns a new
/// `Dataset`; nothing mutates one in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset, padding short records with `Null` and truncating long
    /// ones so every record matches the schema width.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        let width = columns.len();
        let records = records
            .into_iter()
            .map(|mut rec| {
                rec.resize(width, Value::Null);
                rec
            })
            .collect();
        Dataset { columns, records }
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `column`), `None` if either is out of range.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.records.get(row).map(|rec| &rec[idx])
    }

    /// All values of one column in row order.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.records.iter().map(move |rec| &rec[idx]))
    }

    /// Sorted set of distinct values of a column (empty if absent).
    pub fn unique_values(&self, name: &str) -> BTreeSet<Value> {
        self.column(name)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    }

    /// Row count per distinct value of a column.
    pub fn value_counts(&self, name: &str) -> Option<BTreeMap<Value, usize>> {
        let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
        for val in self.column(name)? {
            *counts.entry(val.clone()).or_default() += 1;
        }
        Some(counts)
    }

    /// New dataset with `f` applied to every cell of the named columns, in a
    /// single pass over the records.  Names the dataset lacks are skipped.
    pub fn map_columns<S, F>(&self, names: &[S], mut f: F) -> Dataset
    where
        S: AsRef<str>,
        F: FnMut(&Value) -> Value,
    {
        let mut indices: Vec<usize> = names
            .iter()
            .filter_map(|n| self.column_index(n.as_ref()))
            .collect();
        indices.sort_unstable();
        indices.dedup();
        if indices.is_empty() {
            return self.clone();
        }

        let records = self
            .records
            .iter()
            .map(|rec| {
                let mut rec = rec.clone();
                for &idx in &indices {
                    let mapped = f(&rec[idx]);
                    rec[idx] = mapped;
                }
                rec
            })
            .collect();
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// New dataset holding the records for which `keep` returns true.
    pub fn filter_records<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Record) -> bool,
    {
        Dataset {
            columns: self.columns.clone(),
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}
