use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use car_sales_dash::chart::ChartKind;

use crate::state::{AppState, FILTER_COLUMNS};

// ---------------------------------------------------------------------------
// Left side panel – chart and filter controls
// ---------------------------------------------------------------------------

/// Render the left control panel.  Every change re-runs the pipeline.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Charts");
    ui.separator();

    if state.grouped.is_none() {
        ui.label("No listings loaded.");
        return;
    }

    let numeric = state.numeric_columns();
    let categorical = state.categorical_columns();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- One-click charts ----
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for kind in [ChartKind::Histogram, ChartKind::Scatter] {
                    if ui.button(format!("Show {}", kind.label().to_lowercase())).clicked() {
                        state.show_only(kind);
                    }
                }
            });
            ui.separator();

            // ---- Chart toggles and column pickers ----
            for kind in ChartKind::ALL {
                let mut shown = state.controls.visible.contains(&kind);
                if ui.checkbox(&mut shown, kind.label()).changed() {
                    state.set_chart_visible(kind, shown);
                }
                if !shown {
                    continue;
                }
                let before = state.controls.clone();
                ui.indent(kind.label(), |ui: &mut Ui| {
                    let c = &mut state.controls;
                    match kind {
                        ChartKind::Histogram => {
                            column_combo(ui, "hist_x", "Column", &mut c.histogram_column, &numeric);
                            optional_combo(
                                ui,
                                "hist_split",
                                "Split by",
                                &mut c.histogram_split,
                                &categorical,
                            );
                            ui.add(Slider::new(&mut c.bins, 5..=100).text("bins"));
                        }
                        ChartKind::Scatter => {
                            column_combo(ui, "scatter_x", "X", &mut c.scatter_x, &numeric);
                            column_combo(ui, "scatter_y", "Y", &mut c.scatter_y, &numeric);
                            optional_combo(
                                ui,
                                "scatter_color",
                                "Color by",
                                &mut c.scatter_color,
                                &categorical,
                            );
                        }
                        ChartKind::StackedBar => {
                            let (category, stack) = (&mut c.bar_category, &mut c.bar_stack);
                            column_combo(ui, "bar_x", "Category", category, &categorical);
                            column_combo(ui, "bar_stack", "Stack by", stack, &categorical);
                        }
                    }
                });
                if before != state.controls {
                    state.refresh();
                }
            }
            ui.separator();

            // ---- Rare-group filter ----
            ui.strong("Group size");
            let group_column = state.config.pipeline.group_column.clone();
            let mut changed = ui
                .checkbox(
                    &mut state.group_filter_enabled,
                    format!("Hide rare values of '{group_column}'"),
                )
                .changed();
            ui.add_enabled_ui(state.group_filter_enabled, |ui: &mut Ui| {
                changed |= ui
                    .add(Slider::new(&mut state.min_group_count, 1..=1000).text("min listings"))
                    .changed();
            });
            if changed {
                state.refresh();
            }
            ui.separator();

            // ---- Per-column value filters (collapsible) ----
            ui.strong("Filters");
            for col in FILTER_COLUMNS {
                let Some(all_values) = state.grouped.as_ref().map(|ds| ds.unique_values(col)) else {
                    continue;
                };
                if all_values.is_empty() {
                    continue;
                }
                let n_total = all_values.len();
                let n_selected = all_values
                    .iter()
                    .filter(|v| !state.is_hidden(col, v))
                    .count();
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.show_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.hide_all(col);
                            }
                        });

                        for val in &all_values {
                            let mut checked = !state.is_hidden(col, val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_value(col, val);
                            }
                        }
                    });
            }
        });
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, current: &mut String, options: &[String]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for col in options {
                ui.selectable_value(current, col.clone(), col.as_str());
            }
        });
    ui.label(label);
}

fn optional_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &mut Option<String>,
    options: &[String],
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_deref().unwrap_or("none"))
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(current, None, "none");
            for col in options {
                ui.selectable_value(current, Some(col.clone()), col.as_str());
            }
        });
    ui.label(label);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(state.source.path().display().to_string());

        if let (Some(grouped), Some(view)) = (&state.grouped, &state.view) {
            ui.separator();
            ui.label(format!(
                "{} listings prepared, {} shown",
                grouped.len(),
                view.len()
            ));
        }

        ui.separator();
        ui.toggle_value(&mut state.show_table, "Data table");

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.set_source(path);
    }
}
