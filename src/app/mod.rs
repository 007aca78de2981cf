//! The dashboard window.
//!
//! | Sub-module  | Responsibility |
//! | ----------- | -------------- |
//! | [`update`]  | Per-frame layout: menu bar, side menu, tab strip, dialogs |
//! | [`run`]     | [`run_dashboard()`] entry point |
//!
//! [`DashboardApp`] owns the [`SessionController`] and the backend worker
//! handle. Widgets only emit [`MenuAction`]s and dialog answers; all state
//! changes go through the session after the frame is laid out.

mod run;
mod update;

pub use run::run_dashboard;

use std::path::PathBuf;

use crate::backend::{BackendClient, BackendEvent, BackendJob};
use crate::config::DashboardConfig;
use crate::data::channel::TraceKey;
use crate::data::dataset::{DatasetId, ToggleOutcome};
use crate::error::{DashError, DashResult};
use crate::panels::datasets_ui::MenuAction;
use crate::panels::dialogs_ui::{PeriodAnswer, PeriodInputs};
use crate::session::SessionController;

pub struct DashboardApp {
    cfg: DashboardConfig,
    session: SessionController,
    backend: Option<BackendClient>,
    /// `(bytes_sent, total)` of the running upload.
    upload_progress: Option<(u64, u64)>,
    period_inputs: PeriodInputs,
    period_error: Option<String>,
    style_target: Option<(DatasetId, TraceKey)>,
    upload_into_new_tab: bool,
    status: Option<String>,
}

impl DashboardApp {
    pub fn new(cfg: DashboardConfig) -> Self {
        let (backend, status) = match BackendClient::spawn(&cfg) {
            Ok(client) => (Some(client), None),
            Err(e) => {
                tracing::error!(error = %e, "backend unavailable");
                (None, Some(e.to_string()))
            }
        };
        Self::with_backend(cfg, backend, status)
    }

    fn with_backend(cfg: DashboardConfig, backend: Option<BackendClient>, status: Option<String>) -> Self {
        Self {
            upload_into_new_tab: cfg.upload_into_new_tab,
            cfg,
            session: SessionController::new(),
            backend,
            upload_progress: None,
            period_inputs: PeriodInputs::default(),
            period_error: None,
            style_target: None,
            status,
        }
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    fn report(&mut self, err: DashError) {
        tracing::warn!(error = %err, "action failed");
        self.status = Some(err.to_string());
    }

    fn submit(&self, job: BackendJob) -> DashResult<()> {
        match &self.backend {
            Some(b) => b.submit(job),
            None => Err(DashError::Transport("backend unavailable".into())),
        }
    }

    fn start_upload(&mut self, path: PathBuf) {
        if self.upload_progress.is_some() {
            return;
        }
        self.upload_progress = Some((0, 0));
        if let Err(e) = self.submit(BackendJob::Upload { path }) {
            self.upload_progress = None;
            self.report(e);
        }
    }

    fn pick_and_upload(&mut self) {
        if let Some(path) = rfd::FileDialog::new().set_title("Upload sensor log").pick_file() {
            self.start_upload(path);
        }
    }

    /// Apply every finished backend event.
    fn drain_backend(&mut self) {
        let mut events = Vec::new();
        if let Some(b) = &self.backend {
            while let Some(ev) = b.try_next() {
                events.push(ev);
            }
        }
        for ev in events {
            self.handle_event(ev);
        }
    }

    fn handle_event(&mut self, ev: BackendEvent) {
        match ev {
            BackendEvent::UploadProgress { bytes_sent, total } => {
                self.upload_progress = Some((bytes_sent, total));
            }
            BackendEvent::Uploaded(result) => {
                self.upload_progress = None;
                let ingested = result.and_then(|msg| self.session.ingest_upload(msg, self.upload_into_new_tab));
                match ingested {
                    Ok(ids) => {
                        tracing::info!(datasets = ids.len(), "upload ingested");
                        self.status = None;
                    }
                    Err(e) => self.report(e),
                }
            }
            BackendEvent::Stats { ticket, result } => {
                let handled = match result {
                    Ok(msg) => self.session.handle_stats_response(ticket, msg),
                    Err(e) => {
                        self.session.stats_failed(ticket, &e);
                        Err(e)
                    }
                };
                if let Err(e) = handled {
                    self.report(e);
                }
            }
        }
    }

    fn apply_action(&mut self, action: MenuAction) {
        let result = match action {
            MenuAction::Toggle { dataset, channel, switch } => {
                self.session.toggle(dataset, channel, switch).map(|outcome| {
                    if let ToggleOutcome::NeedsPeriods { .. } = outcome {
                        self.period_error = None;
                    }
                })
            }
            MenuAction::NormalizeX { dataset, enable } => {
                self.session.normalize_x(dataset, enable).map(|_| ())
            }
            MenuAction::NormalizeY { dataset, enable } => {
                self.session.normalize_y(dataset, enable).map(|_| ())
            }
            MenuAction::EditStyle { dataset, key } => {
                self.style_target = Some((dataset, key));
                Ok(())
            }
            MenuAction::Delete(dataset) => {
                if self.style_target.is_some_and(|(d, _)| d == dataset) {
                    self.style_target = None;
                }
                self.session.delete_dataset(dataset).map(|_| ())
            }
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    fn apply_period_answer(&mut self, answer: PeriodAnswer) {
        let resolved = match answer {
            PeriodAnswer::Confirm { avg, stdev } => self.session.resolve_periods(Some((avg, stdev))),
            PeriodAnswer::Cancel => self.session.resolve_periods(None),
        };
        match resolved {
            Ok(outgoing) => {
                self.period_error = None;
                let ticket = outgoing.ticket;
                if let Err(e) = self.submit(BackendJob::Stats(outgoing)) {
                    self.session.stats_failed(ticket, &e);
                    self.report(e);
                }
            }
            Err(DashError::DialogCancelled) => self.period_error = None,
            Err(e @ DashError::InvalidPeriod { .. }) => self.period_error = Some(e.to_string()),
            Err(e) => self.report(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::channel::{ChannelKey, Switch};
    use crate::data::sample::Sample;
    use crate::data::workspace::TabId;

    fn offline_app() -> DashboardApp {
        DashboardApp::with_backend(DashboardConfig::default(), None, None)
    }

    #[test]
    fn failed_upload_submission_unblocks_the_button() {
        let mut app = offline_app();
        app.start_upload(PathBuf::from("log.txt"));
        assert!(app.upload_progress.is_none());
        assert!(app.status.is_some());
    }

    #[test]
    fn failed_stats_submission_releases_the_dataset() {
        let mut app = offline_app();
        let sample = Sample::from_value(serde_json::json!({
            "sensor_name": "imu",
            "timestamps": [0, 1, 2],
            "data": { "0": [1, 2, 3] },
            "timestamp_diffs": [0, 1, 1],
        }))
        .unwrap();
        let ds = app.session.add_sample(sample, TabId(0)).unwrap();
        app.apply_action(MenuAction::Toggle { dataset: ds, channel: ChannelKey::Data(0), switch: Switch::Avg });
        assert!(app.session.dialog().is_some());

        app.apply_period_answer(PeriodAnswer::Confirm { avg: 2, stdev: 2 });
        assert!(app.session.dialog().is_none());
        assert_eq!(app.session.in_flight(), 0);
        assert!(!app.session.stats_pending(ds));
        assert!(app.status.is_some());
    }
}
