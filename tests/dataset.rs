use serde_json::json;

use sensordash::data::sample::Sample;
use sensordash::{ChannelKey, Dataset, IdAllocator, Switch, TabId, ToggleOutcome, TraceKey, Workspace};

const CH0: ChannelKey = ChannelKey::Data(0);

fn sample(name: &str, timestamps: &[f64], values: &[f64]) -> Sample {
    let diffs: Vec<f64> = std::iter::once(0.0)
        .chain(timestamps.windows(2).map(|w| w[1] - w[0]))
        .collect();
    Sample::from_value(json!({
        "sensor_name": name,
        "timestamps": timestamps,
        "data": { "0": values },
        "timestamp_diffs": diffs,
    }))
    .unwrap()
}

fn setup(ts: &[f64], values: &[f64]) -> (Workspace, IdAllocator, Dataset) {
    let mut ws = Workspace::new();
    let mut ids = IdAllocator::new();
    let ds = Dataset::create(0, sample("imu", ts, values), &mut ids, &mut ws, TabId(0)).unwrap();
    (ws, ids, ds)
}

fn y_of(ws: &Workspace, ds: &Dataset, key: TraceKey) -> Vec<f64> {
    let (tab, id) = ds.trace_location(key).unwrap();
    ws.tab(tab).unwrap().trace(id).unwrap().y.clone()
}

fn x_of(ws: &Workspace, ds: &Dataset, key: TraceKey) -> Vec<f64> {
    let (tab, id) = ds.trace_location(key).unwrap();
    ws.tab(tab).unwrap().trace(id).unwrap().x.clone()
}

#[test]
fn create_registers_primary_traces() {
    let (ws, _, ds) = setup(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]);
    let reg = ws.registry(TabId(0)).unwrap();
    assert_eq!(reg.len(), 2);

    let data = reg.get(ds.trace_id(TraceKey::primary(CH0)).unwrap()).unwrap();
    assert_eq!(data.name, "0 imu");
    assert!(data.visible());
    let diffs = reg
        .get(ds.trace_id(TraceKey::primary(ChannelKey::TimestampDiffs)).unwrap())
        .unwrap();
    assert_eq!(diffs.name, "timestamp_diffs imu");
    assert!(!diffs.visible());

    assert_eq!(ds.shown(CH0).map(|s| s.show), Some(true));
    assert_eq!(ds.shown(ChannelKey::TimestampDiffs).map(|s| s.show), Some(false));
}

#[test]
fn normalize_y_maps_channel_onto_unit_range() {
    let (mut ws, _, mut ds) = setup(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 10.0, 20.0, 30.0, 40.0]);
    assert_eq!(ds.normalize_y(true, &mut ws), Ok(true));
    assert_eq!(y_of(&ws, &ds, TraceKey::primary(CH0)), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    assert_eq!(ds.normalize_y(true, &mut ws), Ok(false));

    assert_eq!(ds.normalize_y(false, &mut ws), Ok(true));
    assert_eq!(y_of(&ws, &ds, TraceKey::primary(CH0)), vec![0.0, 10.0, 20.0, 30.0, 40.0]);
}

#[test]
fn constant_channel_normalizes_to_its_sign() {
    let (mut ws, _, mut ds) = setup(&[0.0, 1.0, 2.0], &[-5.0, -5.0, -5.0]);
    ds.normalize_y(true, &mut ws).unwrap();
    assert_eq!(y_of(&ws, &ds, TraceKey::primary(CH0)), vec![-1.0, -1.0, -1.0]);
    ds.normalize_y(false, &mut ws).unwrap();
    assert_eq!(y_of(&ws, &ds, TraceKey::primary(CH0)), vec![-5.0, -5.0, -5.0]);
}

#[test]
fn normalize_x_shifts_to_zero_and_restores_exactly() {
    let (mut ws, _, mut ds) = setup(&[100.0, 101.0, 102.0], &[1.0, 2.0, 3.0]);
    assert_eq!(ds.normalize_x(true, &mut ws), Ok(true));
    assert_eq!(ds.x_origin(), Some(100.0));
    assert_eq!(x_of(&ws, &ds, TraceKey::primary(CH0)), vec![0.0, 1.0, 2.0]);
    assert_eq!(x_of(&ws, &ds, TraceKey::primary(ChannelKey::TimestampDiffs)), vec![0.0, 1.0, 2.0]);

    assert_eq!(ds.normalize_x(false, &mut ws), Ok(true));
    assert!(!ds.is_normalized_x());
    assert_eq!(x_of(&ws, &ds, TraceKey::primary(CH0)), vec![100.0, 101.0, 102.0]);
}

#[test]
fn stat_toggle_without_stats_asks_for_periods() {
    let (mut ws, mut ids, mut ds) = setup(&[0.0, 1.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]);
    let outcome = ds.toggle_trace(CH0, Switch::Stdev, &mut ws, &mut ids).unwrap();
    assert_eq!(outcome, ToggleOutcome::NeedsPeriods { max: 4 });
    assert_eq!(ws.len(), 1);
    assert!(!ds.shown(CH0).unwrap().stdev);
}

#[test]
fn show_toggle_round_trips() {
    let (mut ws, mut ids, mut ds) = setup(&[0.0, 1.0], &[1.0, 2.0]);
    assert_eq!(
        ds.toggle_trace(CH0, Switch::Show, &mut ws, &mut ids),
        Ok(ToggleOutcome::Toggled { shown: false })
    );
    assert!(!ds.shown(CH0).unwrap().show);
    assert_eq!(
        ds.toggle_trace(CH0, Switch::Show, &mut ws, &mut ids),
        Ok(ToggleOutcome::Toggled { shown: true })
    );
    assert!(ds.toggle_trace(ChannelKey::Data(7), Switch::Show, &mut ws, &mut ids).is_err());
}

#[test]
fn histogram_is_created_once_then_toggled() {
    let (mut ws, mut ids, mut ds) = setup(&[0.0, 1.0, 2.0], &[1.0, 1.0, 2.0]);
    assert_eq!(ds.toggle_histogram(CH0, &mut ws, &mut ids), Ok(true));
    let hist_tab = ds.tabs().histogram.unwrap();
    assert_eq!(ws.len(), 2);
    assert_eq!(ws.tab(hist_tab).unwrap().title, "imu histograms");
    assert!(ds.histogram_generated(CH0));

    let (_, id) = ds.trace_location(TraceKey::new(CH0, Switch::Histogram)).unwrap();
    let staged = ws.tab(hist_tab).unwrap().trace(id).unwrap();
    assert_eq!(staged.name, "0 imu histogram");
    assert_eq!(staged.y, vec![1.0, 1.0, 2.0]);

    assert_eq!(ds.toggle_histogram(CH0, &mut ws, &mut ids), Ok(false));
    assert!(!ds.shown(CH0).unwrap().histogram);
    assert_eq!(ws.len(), 2, "no second histogram tab");

    // a second channel reuses the tab
    assert_eq!(ds.toggle_histogram(ChannelKey::TimestampDiffs, &mut ws, &mut ids), Ok(true));
    assert_eq!(ws.len(), 2);
}

#[test]
fn deleting_one_dataset_leaves_the_other_intact() {
    let mut ws = Workspace::new();
    let mut ids = IdAllocator::new();
    let a = Dataset::create(0, sample("a", &[0.0, 1.0], &[1.0, 2.0]), &mut ids, &mut ws, TabId(0)).unwrap();
    let mut b = Dataset::create(1, sample("b", &[0.0, 1.0], &[3.0, 4.0]), &mut ids, &mut ws, TabId(0)).unwrap();
    b.toggle_trace(CH0, Switch::Show, &mut ws, &mut ids).unwrap();

    let b_traces: Vec<_> = b
        .trace_ids()
        .map(|(_, id)| ws.registry(TabId(0)).unwrap().get(id).unwrap().clone())
        .collect();

    assert_eq!(a.delete(&mut ws), 2);
    let reg = ws.registry(TabId(0)).unwrap();
    assert_eq!(reg.len(), 2);
    for t in b_traces {
        assert_eq!(reg.get(t.id), Some(&t));
    }
}
