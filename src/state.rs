use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use car_sales_dash::chart::{self, Chart, ChartKind, ChartRequest};
use car_sales_dash::config::DashboardConfig;
use car_sales_dash::data::filter::{apply_selection, filter_by_group_minimum, Selection};
use car_sales_dash::data::{load_prepared, schema, Dataset, DatasetCache, Source, Value};

/// Columns offered as per-value filters in the side panel.
pub const FILTER_COLUMNS: [&str; 4] = [
    schema::MANUFACTURER,
    schema::TYPE,
    schema::CONDITION,
    schema::FUEL,
];

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

/// Column picks for each chart and which charts are shown.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartControls {
    pub visible: BTreeSet<ChartKind>,
    pub histogram_column: String,
    pub histogram_split: Option<String>,
    pub scatter_x: String,
    pub scatter_y: String,
    pub scatter_color: Option<String>,
    pub bar_category: String,
    pub bar_stack: String,
    pub bins: usize,
}

impl ChartControls {
    pub fn new(bins: usize) -> Self {
        Self {
            visible: [ChartKind::Histogram, ChartKind::Scatter].into(),
            histogram_column: schema::ODOMETER.to_string(),
            histogram_split: None,
            scatter_x: schema::ODOMETER.to_string(),
            scatter_y: schema::PRICE.to_string(),
            scatter_color: None,
            bar_category: schema::MANUFACTURER.to_string(),
            bar_stack: schema::TYPE.to_string(),
            bins,
        }
    }

    pub fn request(&self, kind: ChartKind) -> ChartRequest {
        let (x, y, group_by) = match kind {
            ChartKind::Histogram => (&self.histogram_column, None, self.histogram_split.clone()),
            ChartKind::Scatter => (
                &self.scatter_x,
                Some(self.scatter_y.clone()),
                self.scatter_color.clone(),
            ),
            ChartKind::StackedBar => (&self.bar_category, None, Some(self.bar_stack.clone())),
        };
        ChartRequest {
            kind,
            x: x.clone(),
            y,
            group_by,
            bins: self.bins,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub cache: DatasetCache,
    pub source: Source,

    /// Prepared listings after the rare-group cut-off, before value filters.
    pub grouped: Option<Dataset>,
    /// What the charts draw: `grouped` minus hidden values.
    pub view: Option<Dataset>,

    /// Rare-group filter toggle and threshold.
    pub group_filter_enabled: bool,
    pub min_group_count: usize,

    /// Values unticked in the side panel, per column.
    pub hidden: BTreeMap<String, BTreeSet<Value>>,

    pub controls: ChartControls,
    /// Chart models for the visible charts, rebuilt on every refresh.
    pub charts: Vec<(ChartKind, Option<Chart>)>,

    pub show_table: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let min_group_count = config.pipeline.min_group_count;
        Self {
            source: config.source(),
            cache: DatasetCache::new(),
            grouped: None,
            view: None,
            group_filter_enabled: min_group_count > 0,
            min_group_count: min_group_count.max(1),
            hidden: BTreeMap::new(),
            controls: ChartControls::new(config.histogram_bins),
            charts: Vec::new(),
            show_table: false,
            status_message: None,
            config,
        }
    }

    /// Switch to another listing file and reset per-value filters.
    pub fn set_source(&mut self, path: PathBuf) {
        self.source = Source::new(path).with_delimiter(self.source.delimiter);
        self.hidden.clear();
        self.refresh();
    }

    /// Drop the cached copy and read the source again.
    pub fn reload(&mut self) {
        self.cache.invalidate(&self.source);
        self.refresh();
    }

    /// Re-run the pipeline against the cached dataset and rebuild the charts.
    pub fn refresh(&mut self) {
        // The group threshold is applied below, on the prepared view, so the
        // pipeline itself runs with the cut-off disabled.
        let mut pipeline = self.config.pipeline.clone();
        pipeline.min_group_count = 0;

        match load_prepared(&mut self.cache, &self.source, self.config.cache_ttl(), &pipeline) {
            Ok(prepared) => {
                let threshold = if self.group_filter_enabled {
                    self.min_group_count
                } else {
                    0
                };
                let grouped =
                    filter_by_group_minimum(&prepared, &pipeline.group_column, threshold);
                let view = apply_selection(&grouped, &self.selection(&grouped));
                self.charts = self
                    .controls
                    .visible
                    .iter()
                    .map(|&kind| (kind, chart::build(&view, &self.controls.request(kind))))
                    .collect();
                self.grouped = Some(grouped);
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load listings: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.grouped = None;
                self.view = None;
                self.charts.clear();
            }
        }
    }

    /// Selected values per filter column: everything present minus what the
    /// user unticked.  Values that appear later start out selected.
    fn selection(&self, dataset: &Dataset) -> Selection {
        self.hidden
            .iter()
            .filter(|(_, hidden)| !hidden.is_empty())
            .map(|(col, hidden)| {
                let selected = dataset
                    .unique_values(col)
                    .into_iter()
                    .filter(|v| !hidden.contains(v))
                    .collect();
                (col.clone(), selected)
            })
            .collect()
    }

    pub fn is_hidden(&self, column: &str, value: &Value) -> bool {
        self.hidden.get(column).is_some_and(|h| h.contains(value))
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_value(&mut self, column: &str, value: &Value) {
        let hidden = self.hidden.entry(column.to_string()).or_default();
        if !hidden.remove(value) {
            hidden.insert(value.clone());
        }
        self.refresh();
    }

    /// Select all values in a column.
    pub fn show_all(&mut self, column: &str) {
        self.hidden.remove(column);
        self.refresh();
    }

    /// Deselect all values in a column.
    pub fn hide_all(&mut self, column: &str) {
        if let Some(ds) = &self.grouped {
            self.hidden
                .insert(column.to_string(), ds.unique_values(column));
            self.refresh();
        }
    }

    /// Show `kind` alone with its default column picks.
    pub fn show_only(&mut self, kind: ChartKind) {
        let defaults = ChartControls::new(self.controls.bins);
        let c = &mut self.controls;
        match kind {
            ChartKind::Histogram => {
                c.histogram_column = defaults.histogram_column;
                c.histogram_split = defaults.histogram_split;
            }
            ChartKind::Scatter => {
                c.scatter_x = defaults.scatter_x;
                c.scatter_y = defaults.scatter_y;
                c.scatter_color = defaults.scatter_color;
            }
            ChartKind::StackedBar => {
                c.bar_category = defaults.bar_category;
                c.bar_stack = defaults.bar_stack;
            }
        }
        c.visible = [kind].into();
        self.refresh();
    }

    pub fn set_chart_visible(&mut self, kind: ChartKind, visible: bool) {
        if visible {
            self.controls.visible.insert(kind);
        } else {
            self.controls.visible.remove(&kind);
        }
        self.refresh();
    }

    /// Columns of the current data holding numbers after preparation.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.present(&self.config.pipeline.numeric_columns)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.present(&self.config.pipeline.categorical_columns)
    }

    fn present(&self, names: &[String]) -> Vec<String> {
        match &self.grouped {
            Some(ds) => names.iter().filter(|c| ds.has_column(c)).cloned().collect(),
            None => Vec::new(),
        }
    }
}
