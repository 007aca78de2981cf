use eframe::egui;
use egui_phosphor::regular::UPLOAD_SIMPLE;

use super::DashboardApp;
use crate::panels::datasets_ui::{render_dataset, MenuAction};
use crate::panels::dialogs_ui::render_period_dialog;
use crate::panels::plot_ui::render_tab;
use crate::panels::trace_look_ui::render_trace_look_editor;

impl DashboardApp {
    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("dashboard_top_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                let busy = self.upload_progress.is_some();
                if ui
                    .add_enabled(!busy, egui::Button::new(format!("{UPLOAD_SIMPLE} Upload")))
                    .on_hover_text(format!("Send a log file to {}", self.cfg.server_url))
                    .clicked()
                {
                    self.pick_and_upload();
                }
                ui.checkbox(&mut self.upload_into_new_tab, "Into new tab");
                if let Some((sent, total)) = self.upload_progress {
                    let frac = if total > 0 { sent as f32 / total as f32 } else { 0.0 };
                    ui.add(egui::ProgressBar::new(frac).desired_width(160.0).show_percentage());
                }
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(ui.visuals().warn_fg_color, status);
                }
            });
        });
    }

    fn render_side_menu(&mut self, ctx: &egui::Context) -> Vec<MenuAction> {
        let mut actions = Vec::new();
        egui::SidePanel::left("dashboard_datasets")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.heading("Datasets");
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for ds in self.session.datasets() {
                        let pending = self.session.stats_pending(ds.id());
                        render_dataset(ui, ds, pending, &mut actions);
                    }
                });
            });
        actions
    }

    /// Tab strip plus the active tab's plot. Marks the drawn tab mounted.
    fn render_tabs(&mut self, ctx: &egui::Context) {
        let mut switch_to = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let active = self.session.workspace().active_index();
            ui.horizontal(|ui| {
                for (i, tab) in self.session.workspace().tabs().iter().enumerate() {
                    if ui.selectable_label(i == active, &tab.title).clicked() && i != active {
                        switch_to = Some(i);
                    }
                }
            });
            ui.separator();
            render_tab(ui, self.session.workspace_mut().active_tab_mut());
        });

        let drawn = self.session.workspace().active_id();
        if let Err(e) = self.session.mark_tab_mounted(drawn) {
            self.report(e);
        }
        if let Some(i) = switch_to {
            if let Err(e) = self.session.switch_tab(i) {
                self.report(e);
            }
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(dialog) = self.session.dialog().copied() {
            let answer = render_period_dialog(ctx, &dialog, &mut self.period_inputs, self.period_error.as_deref());
            if let Some(answer) = answer {
                self.apply_period_answer(answer);
            }
        }

        let Some((dataset, key)) = self.style_target else {
            return;
        };
        let mut open = true;
        let mut update = None;
        match self.session.trace(dataset, key) {
            Some(trace) => {
                let (look, kind, name) = (trace.look.clone(), trace.kind, trace.name.clone());
                egui::Window::new(format!("Style: {name}"))
                    .open(&mut open)
                    .resizable(false)
                    .show(ctx, |ui| {
                        update = render_trace_look_editor(&look, kind, ui);
                    });
            }
            None => open = false,
        }
        if let Some(update) = update {
            if let Err(e) = self.session.set_style(dataset, key, update) {
                self.report(e);
            }
        }
        if !open {
            self.style_target = None;
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_backend();

        self.render_top_bar(ctx);
        let actions = self.render_side_menu(ctx);
        self.render_tabs(ctx);
        self.render_dialogs(ctx);

        for action in actions {
            self.apply_action(action);
        }

        // Keep polling the backend while work is outstanding.
        if self.upload_progress.is_some() || self.session.in_flight() > 0 {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}
