//! Draws one workspace tab: scatter traces as points/lines, histogram traces
//! as bar charts binned here from the trace's values.

use egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotUi, Points};

use crate::data::trace_look::PlotMode;
use crate::data::traces::{Trace, TraceKind};
use crate::data::workspace::Tab;

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub center: f64,
    pub width: f64,
    pub count: usize,
}

/// Bin the finite values of `values`.
///
/// The bin count follows Sturges' rule. A constant series yields a single
/// bin of width 1 centred on the value.
pub fn histogram_bins(values: &[f64]) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Vec::new();
    }
    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max == min {
        return vec![Bin { center: min, width: 1.0, count: finite.len() }];
    }

    let n_bins = ((finite.len() as f64).log2().ceil() as usize + 1).clamp(1, 100);
    let width = (max - min) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for v in finite {
        let i = (((v - min) / width) as usize).min(n_bins - 1);
        counts[i] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            center: min + width * (i as f64 + 0.5),
            width,
            count,
        })
        .collect()
}

fn draw_scatter(plot_ui: &mut PlotUi, tr: &Trace) {
    let pts: Vec<[f64; 2]> = tr.x.iter().zip(&tr.y).map(|(x, y)| [*x, *y]).collect();
    let mode = tr.look.mode.unwrap_or(PlotMode::Markers);
    if mode.draws_lines() {
        plot_ui.line(
            Line::new(&tr.name, pts.clone())
                .color(tr.look.color)
                .width(tr.look.width.max(0.1)),
        );
    }
    if mode.draws_markers() && !pts.is_empty() {
        plot_ui.points(
            Points::new(&tr.name, pts)
                .radius(tr.look.point_size.max(0.5))
                .shape(tr.look.marker)
                .color(tr.look.color),
        );
    }
}

fn draw_histogram(plot_ui: &mut PlotUi, tr: &Trace) {
    let bars: Vec<Bar> = histogram_bins(&tr.y)
        .into_iter()
        .map(|b| Bar::new(b.center, b.count as f64).width(b.width))
        .collect();
    plot_ui.bar_chart(BarChart::new(&tr.name, bars).color(tr.look.color));
}

/// Render `tab` into `ui`. The plot view is reset once after the tab was
/// switched to.
pub fn render_tab(ui: &mut Ui, tab: &mut Tab) {
    let mut plot = Plot::new(("tab_plot", tab.id().0))
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_zoom(true)
        .allow_boxed_zoom(true);
    if tab.take_layout_refresh() {
        plot = plot.reset();
    }

    plot.show(ui, |plot_ui| {
        for tr in tab.registry().iter().filter(|t| t.visible()) {
            match tr.kind {
                TraceKind::Scatter => draw_scatter(plot_ui, tr),
                TraceKind::Histogram => draw_histogram(plot_ui, tr),
            }
        }
    });
}
