//! Side menu: one collapsible block per dataset with its channel toggles.

use egui::Ui;
use egui_phosphor::regular::{PALETTE, TRASH};

use crate::data::channel::{ChannelKey, Switch, TraceKey};
use crate::data::dataset::{Dataset, DatasetId};

/// Something the user asked for in the side menu. Applied by the app after
/// the frame's widgets are laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuAction {
    Toggle { dataset: DatasetId, channel: ChannelKey, switch: Switch },
    NormalizeX { dataset: DatasetId, enable: bool },
    NormalizeY { dataset: DatasetId, enable: bool },
    EditStyle { dataset: DatasetId, key: TraceKey },
    Delete(DatasetId),
}

const SWITCHES: [Switch; 4] = [Switch::Show, Switch::Avg, Switch::Stdev, Switch::Histogram];

pub fn render_dataset(ui: &mut Ui, ds: &Dataset, stats_pending: bool, actions: &mut Vec<MenuAction>) {
    let dataset = ds.id();
    let title = match &ds.sample().sensor_id {
        Some(sid) => format!("{} ({sid})", ds.name()),
        None => ds.name().to_string(),
    };
    egui::CollapsingHeader::new(title)
        .id_salt(("dataset", dataset))
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let mut nx = ds.is_normalized_x();
                if ui.checkbox(&mut nx, "Normalize X").changed() {
                    actions.push(MenuAction::NormalizeX { dataset, enable: nx });
                }
                let mut ny = ds.is_normalized_y();
                if ui.checkbox(&mut ny, "Normalize Y").changed() {
                    actions.push(MenuAction::NormalizeY { dataset, enable: ny });
                }
            });

            egui::Grid::new(("channels", dataset)).striped(true).show(ui, |ui| {
                ui.label("");
                for sw in SWITCHES {
                    ui.label(sw.label());
                }
                ui.end_row();

                for channel in ds.channel_keys() {
                    let Some(state) = ds.shown(channel) else {
                        continue;
                    };
                    ui.horizontal(|ui| {
                        ui.label(channel.to_string());
                        if ui
                            .small_button(PALETTE)
                            .on_hover_text("Edit style")
                            .clicked()
                        {
                            actions.push(MenuAction::EditStyle {
                                dataset,
                                key: TraceKey::primary(channel),
                            });
                        }
                    });
                    for switch in SWITCHES {
                        let mut on = state.get(switch);
                        let enabled = !(switch.is_stat() && stats_pending);
                        let resp = ui.add_enabled(enabled, egui::Checkbox::without_text(&mut on));
                        if resp.changed() {
                            actions.push(MenuAction::Toggle { dataset, channel, switch });
                        }
                        if resp.secondary_clicked() && ds.trace_id(TraceKey::new(channel, switch)).is_some() {
                            actions.push(MenuAction::EditStyle {
                                dataset,
                                key: TraceKey::new(channel, switch),
                            });
                        }
                    }
                    ui.end_row();
                }
            });

            if ui
                .button(format!("{TRASH} Delete"))
                .on_hover_text("Remove this dataset and all its traces")
                .clicked()
            {
                actions.push(MenuAction::Delete(dataset));
            }
        });
}
