use egui::Ui;
use egui_plot::MarkerShape;

use crate::data::trace_look::{PlotMode, StyleUpdate, TraceLook};
use crate::data::traces::TraceKind;

const MARKERS: [(MarkerShape, &str); 5] = [
    (MarkerShape::Circle, "Circle"),
    (MarkerShape::Square, "Square"),
    (MarkerShape::Diamond, "Diamond"),
    (MarkerShape::Cross, "Cross"),
    (MarkerShape::Plus, "Plus"),
];

const MODES: [PlotMode; 3] = [PlotMode::Markers, PlotMode::Lines, PlotMode::LinesMarkers];

fn marker_label(marker: MarkerShape) -> &'static str {
    MARKERS
        .iter()
        .find(|(m, _)| *m == marker)
        .map(|(_, l)| *l)
        .unwrap_or("Other")
}

/// Edit color, kind, mode and marker of one trace.
///
/// Returns the change the user made this frame, if any. The caller applies it
/// through the session so staged and registered traces are treated alike.
pub fn render_trace_look_editor(look: &TraceLook, kind: TraceKind, ui: &mut Ui) -> Option<StyleUpdate> {
    let mut update = None;

    ui.horizontal(|ui| {
        ui.label("Color");
        let mut c = look.color;
        if ui.color_edit_button_srgba(&mut c).changed() {
            update = Some(StyleUpdate::color(c));
        }
    });

    egui::ComboBox::from_label("Kind")
        .selected_text(match kind {
            TraceKind::Scatter => "Scatter",
            TraceKind::Histogram => "Histogram",
        })
        .show_ui(ui, |ui| {
            if ui.selectable_label(kind == TraceKind::Scatter, "Scatter").clicked() {
                update = Some(StyleUpdate::kind(TraceKind::Scatter));
            }
            if ui.selectable_label(kind == TraceKind::Histogram, "Histogram").clicked() {
                update = Some(StyleUpdate::kind(TraceKind::Histogram));
            }
        });

    // Mode and marker only mean something for scatter traces.
    ui.add_enabled_ui(kind == TraceKind::Scatter, |ui| {
        let current = look.mode.unwrap_or(PlotMode::Markers);
        egui::ComboBox::from_label("Mode")
            .selected_text(current.label())
            .show_ui(ui, |ui| {
                for mode in MODES {
                    if ui.selectable_label(current == mode, mode.label()).clicked() {
                        update = Some(StyleUpdate::mode(mode));
                    }
                }
            });
        ui.add_enabled_ui(current.draws_markers(), |ui| {
            egui::ComboBox::from_label("Marker shape")
                .selected_text(marker_label(look.marker))
                .show_ui(ui, |ui| {
                    for (marker, label) in MARKERS {
                        if ui.selectable_label(look.marker == marker, label).clicked() {
                            update = Some(StyleUpdate::marker(marker));
                        }
                    }
                });
        });
    });

    update
}
