//! TraceLook: visual styling for plot traces.

use eframe::egui;
use egui_plot::MarkerShape;

/// How a scatter trace connects its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    Markers,
    Lines,
    LinesMarkers,
}

impl PlotMode {
    pub fn draws_markers(&self) -> bool {
        matches!(self, PlotMode::Markers | PlotMode::LinesMarkers)
    }

    pub fn draws_lines(&self) -> bool {
        matches!(self, PlotMode::Lines | PlotMode::LinesMarkers)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlotMode::Markers => "Markers",
            PlotMode::Lines => "Lines",
            PlotMode::LinesMarkers => "Lines + markers",
        }
    }
}

/// The visual presentation of a trace (color, visibility, mode, markers).
///
/// `mode` is `None` while the trace is drawn as a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLook {
    pub color: egui::Color32,
    pub visible: bool,
    pub width: f32,
    pub mode: Option<PlotMode>,
    pub point_size: f32,
    pub marker: MarkerShape,
}

impl Default for TraceLook {
    fn default() -> Self {
        Self {
            color: egui::Color32::GRAY,
            visible: true,
            width: 1.5,
            mode: Some(PlotMode::Markers),
            point_size: 2.5,
            marker: MarkerShape::Circle,
        }
    }
}

impl TraceLook {
    /// Create a new TraceLook with a color allocated based on the trace index.
    pub fn new(index: usize) -> Self {
        Self {
            color: Self::alloc_color(index),
            ..Default::default()
        }
    }

    /// Allocate a distinct color for the given trace index.
    pub fn alloc_color(index: usize) -> egui::Color32 {
        const PALETTE: [egui::Color32; 10] = [
            egui::Color32::from_rgb(31, 119, 180),
            egui::Color32::from_rgb(255, 127, 14),
            egui::Color32::from_rgb(44, 160, 44),
            egui::Color32::from_rgb(214, 39, 40),
            egui::Color32::from_rgb(148, 103, 189),
            egui::Color32::from_rgb(140, 86, 75),
            egui::Color32::from_rgb(227, 119, 194),
            egui::Color32::from_rgb(127, 127, 127),
            egui::Color32::from_rgb(188, 189, 34),
            egui::Color32::from_rgb(23, 190, 207),
        ];
        PALETTE[index % PALETTE.len()]
    }
}

/// Partial style change requested by the style editor.
///
/// Unset fields are left alone. `kind` switches between scatter and histogram
/// rendering; see [`TraceRegistry::set_style`](crate::data::traces::TraceRegistry::set_style).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StyleUpdate {
    pub mode: Option<PlotMode>,
    pub marker: Option<MarkerShape>,
    pub color: Option<egui::Color32>,
    pub kind: Option<crate::data::traces::TraceKind>,
}

impl StyleUpdate {
    pub fn mode(mode: PlotMode) -> Self {
        Self { mode: Some(mode), ..Default::default() }
    }

    pub fn marker(marker: MarkerShape) -> Self {
        Self { marker: Some(marker), ..Default::default() }
    }

    pub fn color(color: egui::Color32) -> Self {
        Self { color: Some(color), ..Default::default() }
    }

    pub fn kind(kind: crate::data::traces::TraceKind) -> Self {
        Self { kind: Some(kind), ..Default::default() }
    }
}
