use egui::Context;

use crate::session::PeriodDialog;

/// What the user did with the period dialog this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAnswer {
    Confirm { avg: usize, stdev: usize },
    Cancel,
}

/// Inputs kept across frames while the dialog is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodInputs {
    pub avg: usize,
    pub stdev: usize,
}

impl Default for PeriodInputs {
    fn default() -> Self {
        Self { avg: 10, stdev: 10 }
    }
}

pub fn render_period_dialog(
    ctx: &Context,
    dialog: &PeriodDialog,
    inputs: &mut PeriodInputs,
    error: Option<&str>,
) -> Option<PeriodAnswer> {
    let max = dialog.max.max(PeriodDialog::MIN_PERIOD);
    let mut answer = None;
    egui::Window::new("Averaging periods")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(format!("Channel {}: choose window sizes (2 to {max})", dialog.channel));
            egui::Grid::new("period_inputs").show(ui, |ui| {
                ui.label("Running average");
                ui.add(egui::DragValue::new(&mut inputs.avg).range(PeriodDialog::MIN_PERIOD..=max));
                ui.end_row();
                ui.label("Standard deviation");
                ui.add(egui::DragValue::new(&mut inputs.stdev).range(PeriodDialog::MIN_PERIOD..=max));
                ui.end_row();
            });
            if let Some(err) = error {
                ui.colored_label(ui.visuals().error_fg_color, err);
            }
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    answer = Some(PeriodAnswer::Confirm { avg: inputs.avg, stdev: inputs.stdev });
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(PeriodAnswer::Cancel);
                }
            });
        });
    answer
}
