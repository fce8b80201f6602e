use eframe::egui::{ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use car_sales_dash::chart::{Chart, ChartKind, Histogram, Scatter, StackedBar};

use crate::color::ColorMap;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Chart area (central panel)
// ---------------------------------------------------------------------------

/// Render every visible chart, stacked vertically.
pub fn chart_area(ui: &mut Ui, state: &AppState) {
    if state.view.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No listings loaded  (File → Open…)");
        });
        return;
    }
    if state.charts.is_empty() {
        ui.label("Tick a chart in the side panel to display it.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (kind, chart) in &state.charts {
                ui.strong(kind.label());
                match chart {
                    Some(Chart::Histogram(h)) => histogram_plot(ui, h),
                    Some(Chart::Scatter(s)) => scatter_plot(ui, s),
                    Some(Chart::StackedBar(b)) => stacked_bar_plot(ui, b),
                    None => {
                        ui.label(missing_text(*kind));
                    }
                }
                ui.add_space(8.0);
            }
        });
}

fn missing_text(kind: ChartKind) -> String {
    format!("{kind}: the selected columns are missing or hold no values.")
}

/// Bars for each series, stacked on the series drawn before it.
fn stacked(series: Vec<(String, Vec<Bar>)>) -> Vec<BarChart> {
    let colors = ColorMap::new(series.iter().map(|(name, _)| name.as_str()));
    let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());
    for (name, bars) in series {
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(&name)
            .color(colors.color_for(&name))
            .stack_on(&below);
        charts.push(chart);
    }
    charts
}

fn histogram_plot(ui: &mut Ui, h: &Histogram) {
    let width = h.edges.get(1).zip(h.edges.first()).map_or(1.0, |(b, a)| b - a);
    let width = if width > 0.0 { width } else { 1.0 };
    let series = h
        .series
        .iter()
        .map(|s| {
            let bars = s
                .data
                .iter()
                .enumerate()
                .map(|(i, &count)| Bar::new(h.edges[i] + width / 2.0, count as f64).width(width))
                .collect();
            (s.name.clone(), bars)
        })
        .collect();

    Plot::new("histogram")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(h.column.as_str())
        .y_axis_label("listings")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in stacked(series) {
                plot_ui.bar_chart(chart);
            }
        });
}

fn scatter_plot(ui: &mut Ui, s: &Scatter) {
    let colors = ColorMap::new(s.series.iter().map(|series| series.name.as_str()));

    Plot::new("scatter")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(s.x.as_str())
        .y_axis_label(s.y.as_str())
        .allow_boxed_zoom(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &s.series {
                let points = Points::new(PlotPoints::from(series.data.clone()))
                    .name(&series.name)
                    .color(colors.color_for(&series.name))
                    .radius(2.0);
                plot_ui.points(points);
            }
        });
}

fn stacked_bar_plot(ui: &mut Ui, b: &StackedBar) {
    let labels: Vec<String> = b.categories.iter().map(|c| c.to_string()).collect();
    let series = b
        .segments
        .iter()
        .map(|seg| {
            let bars = seg
                .data
                .iter()
                .enumerate()
                .map(|(i, &count)| {
                    Bar::new(i as f64, count as f64)
                        .width(0.8)
                        .name(&labels[i])
                })
                .collect();
            (seg.name.clone(), bars)
        })
        .collect();

    let axis_labels = labels.clone();
    Plot::new("stacked_bar")
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(b.category.as_str())
        .y_axis_label("listings")
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            axis_labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in stacked(series) {
                plot_ui.bar_chart(chart);
            }
        });
}
