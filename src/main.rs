mod app;
mod color;
mod state;
mod ui;

use app::CarSalesApp;
use car_sales_dash::config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let state = match DashboardConfig::discover() {
        Ok(config) => AppState::new(config),
        Err(e) => {
            log::error!("Invalid configuration, falling back to defaults: {e:#}");
            let mut state = AppState::new(DashboardConfig::default());
            state.status_message = Some(format!("Config error: {e:#}"));
            state
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Car Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CarSalesApp::new(state)))),
    )
}
