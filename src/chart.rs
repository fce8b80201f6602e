//! Chart models: the numbers a renderer needs, computed from a prepared
//! dataset and a column selection.  Nothing here knows how charts are drawn.

use std::collections::BTreeMap;
use std::fmt;

use crate::data::{Dataset, Value};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Histogram,
    Scatter,
    StackedBar,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [
        ChartKind::Histogram,
        ChartKind::Scatter,
        ChartKind::StackedBar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Scatter => "Scatter plot",
            ChartKind::StackedBar => "Stacked bar",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the control surface asks for.
///
/// * Histogram: `x` numeric, `group_by` optionally splits each bin.
/// * Scatter: `x` and `y` numeric, `group_by` optionally splits the points.
/// * Stacked bar: `x` is the category axis, `group_by` the stacked segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
    pub group_by: Option<String>,
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Histogram(Histogram),
    Scatter(Scatter),
    StackedBar(StackedBar),
}

/// Build the chart a request describes.  `None` when a needed column is
/// missing or holds nothing plottable.
pub fn build(dataset: &Dataset, request: &ChartRequest) -> Option<Chart> {
    let group_by = request.group_by.as_deref();
    match request.kind {
        ChartKind::Histogram => {
            histogram(dataset, &request.x, group_by, request.bins).map(Chart::Histogram)
        }
        ChartKind::Scatter => {
            let y = request.y.as_deref()?;
            scatter(dataset, &request.x, y, group_by).map(Chart::Scatter)
        }
        ChartKind::StackedBar => {
            let stack_by = group_by.unwrap_or(&request.x);
            stacked_bar(dataset, &request.x, stack_by).map(Chart::StackedBar)
        }
    }
}

/// Group label of a row; rows fall into a single unnamed group when there is
/// no grouping column.
fn group_key(dataset: &Dataset, row: usize, group_by: Option<usize>) -> Value {
    match group_by {
        Some(idx) => dataset.records()[row][idx].clone(),
        None => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins shared by every series.  `edges` has one more entry than
/// each series has counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub edges: Vec<f64>,
    pub series: Vec<Series<usize>>,
}

impl Histogram {
    pub fn bin_count(&self) -> usize {
        self.edges.len().saturating_sub(1)
    }

    /// Sum of all counts across series.
    pub fn total(&self) -> usize {
        self.series.iter().flat_map(|s| s.data.iter()).sum()
    }
}

/// A named run of data points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T> {
    pub name: String,
    pub data: Vec<T>,
}

/// Bin the finite values of `column` into `bins` equal-width buckets.  The
/// maximum lands in the last bucket; a column with a single distinct value
/// yields one bucket.
pub fn histogram(
    dataset: &Dataset,
    column: &str,
    group_by: Option<&str>,
    bins: usize,
) -> Option<Histogram> {
    let idx = dataset.column_index(column)?;
    let group_idx = group_by.and_then(|g| dataset.column_index(g));

    let values: Vec<(usize, f64)> = dataset
        .records()
        .iter()
        .enumerate()
        .filter_map(|(row, rec)| rec[idx].as_f64().map(|v| (row, v)))
        .collect();
    if values.is_empty() {
        return None;
    }

    let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
    let bins = if max > min { bins.max(1) } else { 1 };
    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let mut counts: BTreeMap<Value, Vec<usize>> = BTreeMap::new();
    for (row, v) in values {
        let bin = if width > 0.0 {
            (((v - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        counts
            .entry(group_key(dataset, row, group_idx))
            .or_insert_with(|| vec![0; bins])[bin] += 1;
    }

    Some(Histogram {
        column: column.to_string(),
        edges,
        series: into_series(counts, column),
    })
}

fn into_series<T>(groups: BTreeMap<Value, Vec<T>>, ungrouped_name: &str) -> Vec<Series<T>> {
    groups
        .into_iter()
        .map(|(key, data)| Series {
            name: match key {
                Value::Null => ungrouped_name.to_string(),
                other => other.to_string(),
            },
            data,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub x: String,
    pub y: String,
    pub series: Vec<Series<[f64; 2]>>,
}

impl Scatter {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.data.len()).sum()
    }
}

/// Points for rows where both coordinates are numeric.
pub fn scatter(dataset: &Dataset, x: &str, y: &str, group_by: Option<&str>) -> Option<Scatter> {
    let xi = dataset.column_index(x)?;
    let yi = dataset.column_index(y)?;
    let group_idx = group_by.and_then(|g| dataset.column_index(g));

    let mut groups: BTreeMap<Value, Vec<[f64; 2]>> = BTreeMap::new();
    for (row, rec) in dataset.records().iter().enumerate() {
        if let (Some(px), Some(py)) = (rec[xi].as_f64(), rec[yi].as_f64()) {
            groups
                .entry(group_key(dataset, row, group_idx))
                .or_default()
                .push([px, py]);
        }
    }
    if groups.is_empty() {
        return None;
    }

    Some(Scatter {
        x: x.to_string(),
        y: y.to_string(),
        series: into_series(groups, &format!("{y} vs {x}")),
    })
}

// ---------------------------------------------------------------------------
// Stacked bar
// ---------------------------------------------------------------------------

/// Row counts per category, split into stacked segments.  Every segment's
/// `data` is aligned with `categories` and zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub category: String,
    pub stack_by: String,
    pub categories: Vec<Value>,
    pub segments: Vec<Series<usize>>,
}

impl StackedBar {
    /// Height of the full stack for the category at `index`.
    pub fn total_at(&self, index: usize) -> usize {
        self.segments.iter().filter_map(|s| s.data.get(index)).sum()
    }
}

pub fn stacked_bar(dataset: &Dataset, category: &str, stack_by: &str) -> Option<StackedBar> {
    let ci = dataset.column_index(category)?;
    let si = dataset.column_index(stack_by)?;
    if dataset.is_empty() {
        return None;
    }

    let categories: Vec<Value> = dataset.unique_values(category).into_iter().collect();
    let position: BTreeMap<&Value, usize> =
        categories.iter().enumerate().map(|(i, v)| (v, i)).collect();

    let mut segments: BTreeMap<Value, Vec<usize>> = BTreeMap::new();
    for rec in dataset.records() {
        let slot = position[&rec[ci]];
        segments
            .entry(rec[si].clone())
            .or_insert_with(|| vec![0; categories.len()])[slot] += 1;
    }

    Some(StackedBar {
        category: category.to_string(),
        stack_by: stack_by.to_string(),
        segments: into_series(segments, "<null>"),
        categories,
    })
}
