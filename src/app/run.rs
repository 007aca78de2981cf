//! Top-level entry point for running the dashboard as a native window.

use eframe::egui;

use super::DashboardApp;
use crate::config::DashboardConfig;

/// Open the dashboard window and block until it is closed.
pub fn run_dashboard(cfg: DashboardConfig) -> eframe::Result<()> {
    let title = cfg.title.clone();
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(cfg.window_size),
        ..Default::default()
    };
    let app = DashboardApp::new(cfg);

    eframe::run_native(
        &title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}
