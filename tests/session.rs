use serde_json::json;

use sensordash::data::stats::LocalStats;
use sensordash::{
    BackendMessage, ChannelKey, DashError, DatasetId, SessionController, StatsPayload, Switch, TabId,
    ToggleOutcome, TraceKey,
};

const CH0: ChannelKey = ChannelKey::Data(0);

fn upload_message(samples: &[serde_json::Value]) -> BackendMessage {
    let encoded: Vec<String> = samples.iter().map(|s| s.to_string()).collect();
    let data = serde_json::to_string(&encoded).unwrap();
    BackendMessage::from_json(&json!({ "type": "upload", "data": data }).to_string()).unwrap()
}

fn imu() -> serde_json::Value {
    json!({
        "sensor_name": "imu",
        "timestamps": [0, 1, 2, 3, 4],
        "data": { "0": [0, 10, 20, 30, 40] },
        "timestamp_diffs": [0, 1, 1, 1, 1],
    })
}

fn session_with_imu() -> (SessionController, DatasetId) {
    let mut s = SessionController::new();
    let ids = s.ingest_upload(upload_message(&[imu()]), false).unwrap();
    (s, ids[0])
}

#[test]
fn upload_lands_on_active_tab() {
    let (s, ds) = session_with_imu();
    assert_eq!(s.workspace().len(), 1);
    assert_eq!(s.dataset(ds).unwrap().tabs().plot, TabId(0));
    assert_eq!(s.workspace().registry(TabId(0)).unwrap().len(), 2);
}

#[test]
fn upload_into_new_tab_is_staged_until_mounted() {
    let mut s = SessionController::new();
    let ids = s.ingest_upload(upload_message(&[imu(), imu()]), true).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(s.workspace().len(), 2);
    let tab = s.workspace().active_id();
    assert_eq!(s.workspace().tab(tab).unwrap().title, "Tab1");
    assert!(s.workspace().registry(tab).unwrap().is_empty());
    assert_eq!(s.mark_tab_mounted(tab), Ok(4));
    assert_eq!(s.workspace().registry(tab).unwrap().len(), 4);
}

#[test]
fn stats_message_is_not_an_upload() {
    let mut s = SessionController::new();
    let err = s
        .ingest_upload(BackendMessage::Stats(StatsPayload::default()), false)
        .unwrap_err();
    assert!(matches!(err, DashError::MalformedResponse(_)));
}

#[test]
fn cancelling_the_period_dialog_changes_nothing() {
    let (mut s, ds) = session_with_imu();
    let outcome = s.toggle(ds, CH0, Switch::Stdev).unwrap();
    assert_eq!(outcome, ToggleOutcome::NeedsPeriods { max: 5 });
    assert!(s.dialog().is_some());

    // only one dialog at a time
    assert_eq!(s.toggle(ds, CH0, Switch::Avg), Err(DashError::StatsPending(ds)));

    assert_eq!(s.resolve_periods(None), Err(DashError::DialogCancelled));
    assert!(s.dialog().is_none());
    assert_eq!(s.workspace().len(), 1);
    assert_eq!(s.in_flight(), 0);
    let d = s.dataset(ds).unwrap();
    assert!(!d.shown(CH0).unwrap().stdev);
    assert!(!d.has_stats_tab());
}

#[test]
fn invalid_periods_keep_the_dialog_open() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Avg).unwrap();
    assert_eq!(s.confirm_periods(1, 3), Err(DashError::InvalidPeriod { value: 1, max: 5 }));
    assert_eq!(s.confirm_periods(3, 6), Err(DashError::InvalidPeriod { value: 6, max: 5 }));
    assert!(s.dialog().is_some());
    assert_eq!(s.workspace().len(), 1);
    assert!(s.confirm_periods(2, 5).is_ok());
}

#[test]
fn stats_round_trip_shows_requested_trace_only() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Avg).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();
    assert_eq!(out.request.avg_period, 2);
    assert_eq!(out.request.channels.len(), 2);
    assert_eq!(s.workspace().len(), 2);
    let stats_tab = s.dataset(ds).unwrap().tabs().stdev.unwrap();
    assert_eq!(s.workspace().tab(stats_tab).unwrap().title, "imu stats");

    // a second stat toggle while the request is out is refused
    assert_eq!(s.toggle(ds, CH0, Switch::Stdev), Err(DashError::StatsPending(ds)));

    let reply = BackendMessage::Stats(LocalStats.answer(&out.request));
    assert_eq!(s.handle_stats_response(out.ticket, reply), Ok(true));
    assert_eq!(s.in_flight(), 0);

    let d = s.dataset(ds).unwrap();
    let state = d.shown(CH0).unwrap();
    assert!(state.avg);
    assert!(!state.stdev);

    let avg = s.trace(ds, TraceKey::new(CH0, Switch::Avg)).unwrap();
    assert_eq!(avg.name, "0 imu running avg");
    assert_eq!(avg.y, vec![0.0, 5.0, 15.0, 25.0, 35.0]);
    assert!(avg.visible());
    let stdev = s.trace(ds, TraceKey::new(CH0, Switch::Stdev)).unwrap();
    assert_eq!(stdev.name, "0 imu stdev");
    assert!(!stdev.visible());

    // stdev traces wait for their tab to mount
    assert!(s.workspace().registry(stats_tab).unwrap().is_empty());
    assert_eq!(s.mark_tab_mounted(stats_tab), Ok(2));

    assert_eq!(s.toggle(ds, CH0, Switch::Stdev), Ok(ToggleOutcome::Toggled { shown: true }));
    assert_eq!(s.toggle(ds, CH0, Switch::Avg), Ok(ToggleOutcome::Toggled { shown: false }));
}

#[test]
fn open_dialog_only_blocks_datasets_without_stats() {
    let mut s = SessionController::new();
    let ids = s.ingest_upload(upload_message(&[imu(), imu(), imu()]), false).unwrap();
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    s.toggle(a, CH0, Switch::Avg).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();
    let reply = BackendMessage::Stats(LocalStats.answer(&out.request));
    assert_eq!(s.handle_stats_response(out.ticket, reply), Ok(true));

    assert_eq!(s.toggle(b, CH0, Switch::Stdev), Ok(ToggleOutcome::NeedsPeriods { max: 5 }));
    assert_eq!(s.dialog().unwrap().dataset, b);

    // a already has statistics: plain visibility flips
    assert_eq!(s.toggle(a, CH0, Switch::Avg), Ok(ToggleOutcome::Toggled { shown: false }));
    assert_eq!(s.toggle(a, CH0, Switch::Stdev), Ok(ToggleOutcome::Toggled { shown: true }));

    // c would need a second dialog
    assert_eq!(s.toggle(c, CH0, Switch::Avg), Err(DashError::StatsPending(c)));
    assert_eq!(s.toggle(b, CH0, Switch::Avg), Err(DashError::StatsPending(b)));
    assert_eq!(s.dialog().unwrap().dataset, b);

    // non-stat toggles are never blocked
    assert_eq!(s.toggle(c, CH0, Switch::Show), Ok(ToggleOutcome::Toggled { shown: false }));
}

#[test]
fn late_response_after_delete_is_ignored() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Stdev).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();
    let stats_tab = s.dataset(ds).unwrap().tabs().stdev.unwrap();

    assert_eq!(s.delete_dataset(ds), Ok(2));
    assert_eq!(s.in_flight(), 0);

    let reply = BackendMessage::Stats(LocalStats.answer(&out.request));
    assert_eq!(s.handle_stats_response(out.ticket, reply), Ok(false));
    assert!(s.workspace().tab(stats_tab).unwrap().staged().is_empty());
    assert!(s.workspace().registry(TabId(0)).unwrap().is_empty());
    let peek = s.id_allocator().peek();
    assert_eq!(peek, 2, "no ids spent on the stale response");
}

#[test]
fn malformed_stats_register_nothing_and_allow_retry() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Avg).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();

    let mut payload = LocalStats.answer(&out.request);
    payload.stdevs.remove(&ChannelKey::TimestampDiffs);
    let err = s.handle_stats_response(out.ticket, BackendMessage::Stats(payload)).unwrap_err();
    assert!(matches!(err, DashError::MalformedResponse(_)));

    let d = s.dataset(ds).unwrap();
    assert!(d.trace_id(TraceKey::new(CH0, Switch::Avg)).is_none());
    assert!(!d.has_stats_tab());
    assert_eq!(s.workspace().registry(TabId(0)).unwrap().len(), 2);

    assert_eq!(s.toggle(ds, CH0, Switch::Avg), Ok(ToggleOutcome::NeedsPeriods { max: 5 }));
}

#[test]
fn wrong_message_type_leaves_request_pending() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Avg).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();
    assert_eq!(s.handle_stats_response(out.ticket, upload_message(&[imu()])), Ok(false));
    assert_eq!(s.in_flight(), 1);
    assert!(s.stats_pending(ds));
}

#[test]
fn transport_failure_releases_the_dataset() {
    let (mut s, ds) = session_with_imu();
    s.toggle(ds, CH0, Switch::Avg).unwrap();
    let out = s.confirm_periods(2, 2).unwrap();
    s.stats_failed(out.ticket, &DashError::Transport("connection refused".into()));
    assert_eq!(s.in_flight(), 0);
    assert_eq!(s.toggle(ds, CH0, Switch::Avg), Ok(ToggleOutcome::NeedsPeriods { max: 5 }));
}

#[test]
fn unknown_dataset_is_an_error() {
    let mut s = SessionController::new();
    assert_eq!(s.normalize_x(3, true), Err(DashError::UnknownDataset(3)));
    assert_eq!(s.delete_dataset(3), Err(DashError::UnknownDataset(3)));
    assert_eq!(s.cancel_periods(), Err(DashError::NoDialog));
}
