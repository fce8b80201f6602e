use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use car_sales_dash::data::Dataset;

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable preview of the listings behind the charts.  Rows are laid out
/// lazily, so large views stay cheap.
pub fn data_table(ui: &mut Ui, dataset: &Dataset) {
    let columns = dataset.columns();
    let records = dataset.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for col in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, records.len(), |mut row| {
                let record = &records[row.index()];
                for value in record {
                    row.col(|ui: &mut Ui| {
                        ui.label(value.to_string());
                    });
                }
            });
        });
}
