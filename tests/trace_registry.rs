use std::collections::HashSet;

use egui_plot::MarkerShape;
use sensordash::data::trace_look::{PlotMode, StyleUpdate, TraceLook};
use sensordash::{DashError, Trace, TraceKind, TraceRegistry};

fn registry_with(ids: &[u64]) -> TraceRegistry {
    let mut reg = TraceRegistry::new();
    for &id in ids {
        reg.add_trace(vec![0.0, 1.0], vec![id as f64, 2.0], id, format!("t{id}"), true)
            .unwrap();
    }
    reg
}

fn assert_index_consistent(reg: &TraceRegistry) {
    for id in reg.ids() {
        assert_eq!(reg.get(id).map(|t| t.id), Some(id), "lookup for {id} points at the wrong trace");
    }
}

#[test]
fn shape_mismatch_is_rejected() {
    let mut reg = TraceRegistry::new();
    let err = reg.add_trace(vec![0.0, 1.0], vec![1.0], 7, "bad", true).unwrap_err();
    assert_eq!(err, DashError::ShapeMismatch { id: 7, x_len: 2, y_len: 1 });
    assert!(reg.is_empty());
}

#[test]
fn duplicate_id_is_rejected() {
    let mut reg = registry_with(&[1]);
    let err = reg.add_trace(vec![], vec![], 1, "again", true).unwrap_err();
    assert_eq!(err, DashError::DuplicateTrace(1));
    assert_eq!(reg.len(), 1);
}

#[test]
fn index_survives_mixed_adds_and_removals() {
    let mut reg = registry_with(&[0, 1, 2, 3, 4, 5]);
    let removed = reg.remove_many(&HashSet::from([1, 4]));
    assert_eq!(removed, 2);
    assert_index_consistent(&reg);

    reg.add_trace(vec![0.0], vec![0.0], 9, "late", false).unwrap();
    reg.remove_many(&HashSet::from([0, 99]));
    assert_index_consistent(&reg);
    assert_eq!(reg.ids(), vec![2, 3, 5, 9]);
    assert!(!reg.contains(0));
    assert!(!reg.get(9).unwrap().visible());
}

#[test]
fn toggling_twice_restores_visibility() {
    let mut reg = registry_with(&[3]);
    assert!(!reg.toggle_visibility(3).unwrap());
    assert!(reg.toggle_visibility(3).unwrap());
    assert!(reg.get(3).unwrap().visible());
    assert_eq!(reg.toggle_visibility(42), Err(DashError::UnknownTrace(42)));
}

#[test]
fn set_axis_x_reports_unknown_after_updating_known() {
    let mut reg = registry_with(&[0, 1]);
    let err = reg.set_axis_x(&[0, 8, 1], &[5.0, 6.0]).unwrap_err();
    assert_eq!(err, DashError::UnknownTrace(8));
    assert_eq!(reg.get(0).unwrap().x, vec![5.0, 6.0]);
    assert_eq!(reg.get(1).unwrap().x, vec![5.0, 6.0]);
}

#[test]
fn style_switches_between_scatter_and_histogram() {
    let mut reg = TraceRegistry::new();
    reg.insert(Trace::histogram(0, "h", vec![0.0, 1.0], vec![1.0, 1.0], true).unwrap())
        .unwrap();
    assert_eq!(reg.get(0).unwrap().look.mode, None);

    reg.set_style(0, StyleUpdate::kind(TraceKind::Scatter)).unwrap();
    let t = reg.get(0).unwrap();
    assert_eq!(t.kind, TraceKind::Scatter);
    assert_eq!(t.look.mode, Some(PlotMode::Markers));

    reg.set_style(0, StyleUpdate::mode(PlotMode::Lines)).unwrap();
    reg.set_style(0, StyleUpdate::marker(MarkerShape::Diamond)).unwrap();
    let t = reg.get(0).unwrap();
    assert_eq!(t.look.mode, Some(PlotMode::Lines));
    assert_eq!(t.look.marker, MarkerShape::Diamond);

    reg.set_style(0, StyleUpdate::kind(TraceKind::Histogram)).unwrap();
    assert_eq!(reg.get(0).unwrap().kind, TraceKind::Histogram);
    assert_eq!(reg.get(0).unwrap().look.mode, None);
}

#[test]
fn set_visible_is_absolute() {
    let mut reg = registry_with(&[1, 2]);
    reg.set_visible(1, false).unwrap();
    reg.set_visible(1, false).unwrap();
    assert!(!reg.get(1).unwrap().visible());
    assert!(reg.get(2).unwrap().visible());
    assert_eq!(reg.set_visible(9, true), Err(DashError::UnknownTrace(9)));
}

#[test]
fn palette_color_follows_trace_id() {
    let reg = registry_with(&[0, 1, 12]);
    let colors: Vec<_> = reg.iter().map(|t| t.look.color).collect();
    assert_ne!(colors[0], colors[1]);
    assert_eq!(colors[2], TraceLook::alloc_color(12));
    assert_eq!(colors[0], TraceLook::alloc_color(0));
}
