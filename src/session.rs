//! SessionController: turns backend messages and user actions into dataset
//! and workspace changes.
//!
//! Everything runs on the UI event loop. The two places where a flow waits on
//! the outside world are modelled as explicit state:
//! - the averaging-period dialog ([`PeriodDialog`]), opened when statistics
//!   are toggled for the first time;
//! - the in-flight statistics request, identified by a [`StatsTicket`].

use std::collections::{BTreeMap, HashMap};

use crate::data::channel::{ChannelKey, Switch, TraceKey};
use crate::data::dataset::{Dataset, DatasetId, ToggleOutcome};
use crate::data::ids::IdAllocator;
use crate::data::sample::Sample;
use crate::data::trace_look::StyleUpdate;
use crate::data::traces::Trace;
use crate::data::workspace::{TabId, Workspace};
use crate::error::{DashError, DashResult};
use crate::protocol::{BackendMessage, StatsRequest};

/// Identifies one in-flight statistics request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatsTicket(pub u64);

/// The open "choose averaging periods" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodDialog {
    pub dataset: DatasetId,
    pub channel: ChannelKey,
    pub switch: Switch,
    /// Number of samples; the upper bound for both periods.
    pub max: usize,
}

impl PeriodDialog {
    pub const MIN_PERIOD: usize = 2;

    pub fn validate(&self, avg_period: usize, stdev_period: usize) -> DashResult<()> {
        for value in [avg_period, stdev_period] {
            if !(Self::MIN_PERIOD..=self.max).contains(&value) {
                return Err(DashError::InvalidPeriod { value, max: self.max });
            }
        }
        Ok(())
    }
}

/// A statistics request ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingStats {
    pub ticket: StatsTicket,
    pub request: StatsRequest,
}

#[derive(Debug, Clone, Copy)]
struct PendingStats {
    dataset: DatasetId,
    channel: ChannelKey,
    switch: Switch,
}

#[derive(Debug, Default)]
pub struct SessionController {
    ids: IdAllocator,
    workspace: Workspace,
    datasets: BTreeMap<DatasetId, Dataset>,
    next_dataset: DatasetId,
    dialog: Option<PeriodDialog>,
    in_flight: HashMap<StatsTicket, PendingStats>,
    next_ticket: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn dataset(&self, id: DatasetId) -> Option<&Dataset> {
        self.datasets.get(&id)
    }

    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.datasets.values()
    }

    pub fn dialog(&self) -> Option<&PeriodDialog> {
        self.dialog.as_ref()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// The trace a dataset shows for `key`, wherever it lives.
    pub fn trace(&self, dataset: DatasetId, key: TraceKey) -> Option<&Trace> {
        let (tab, id) = self.datasets.get(&dataset)?.trace_location(key)?;
        self.workspace.tab(tab)?.trace(id)
    }

    /// Register every sample of an upload response.
    ///
    /// Samples land on the active tab, or on a fresh tab when
    /// `into_new_tab` is set. Non-upload messages are rejected.
    pub fn ingest_upload(
        &mut self,
        message: BackendMessage,
        into_new_tab: bool,
    ) -> DashResult<Vec<DatasetId>> {
        let payload = match message {
            BackendMessage::Upload(payload) => payload,
            other => {
                return Err(DashError::MalformedResponse(format!(
                    "expected an upload response, got '{}'",
                    other.kind()
                )))
            }
        };
        let samples = payload.samples()?;
        let tab = if into_new_tab {
            self.workspace.new_tab(format!("Tab{}", self.workspace.len()))
        } else {
            self.workspace.active_id()
        };
        samples
            .into_iter()
            .map(|sample| self.add_sample(sample, tab))
            .collect()
    }

    /// Create one dataset on `tab`.
    pub fn add_sample(&mut self, sample: Sample, tab: TabId) -> DashResult<DatasetId> {
        let id = self.next_dataset;
        let dataset = Dataset::create(id, sample, &mut self.ids, &mut self.workspace, tab)?;
        self.next_dataset += 1;
        self.datasets.insert(id, dataset);
        Ok(id)
    }

    fn stats_busy(&self, dataset: DatasetId) -> bool {
        self.dialog.is_some_and(|d| d.dataset == dataset)
            || self.in_flight.values().any(|p| p.dataset == dataset)
    }

    /// Toggle one of a channel's traces.
    ///
    /// The first Avg/Stdev toggle of a dataset opens the period dialog and
    /// returns [`ToggleOutcome::NeedsPeriods`]. Stat toggles are rejected
    /// while the dataset's own dialog is open or its statistics are in
    /// flight, and a second dialog cannot open while another one is up.
    /// Datasets that already have statistics keep flipping them freely.
    pub fn toggle(
        &mut self,
        dataset: DatasetId,
        channel: ChannelKey,
        switch: Switch,
    ) -> DashResult<ToggleOutcome> {
        let busy = switch.is_stat() && self.stats_busy(dataset);
        let ds = self.datasets.get_mut(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        if busy || (switch.is_stat() && self.dialog.is_some() && !ds.has_stats_tab()) {
            return Err(DashError::StatsPending(dataset));
        }
        let outcome = ds.toggle_trace(channel, switch, &mut self.workspace, &mut self.ids)?;
        if let ToggleOutcome::NeedsPeriods { max } = outcome {
            tracing::debug!(dataset, %channel, "asking for averaging periods");
            self.dialog = Some(PeriodDialog { dataset, channel, switch, max });
        }
        Ok(outcome)
    }

    /// Accept the dialog's periods: create the stdev tab and hand back the
    /// request to send. Invalid periods keep the dialog open.
    pub fn confirm_periods(&mut self, avg_period: usize, stdev_period: usize) -> DashResult<OutgoingStats> {
        let dialog = self.dialog.ok_or(DashError::NoDialog)?;
        dialog.validate(avg_period, stdev_period)?;
        self.dialog = None;

        let ds = self
            .datasets
            .get_mut(&dialog.dataset)
            .ok_or(DashError::UnknownDataset(dialog.dataset))?;
        let tab = self.workspace.new_tab(format!("{} stats", ds.name()));
        ds.begin_stats(tab);
        let request = ds.stats_request(avg_period, stdev_period);

        let ticket = StatsTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight.insert(
            ticket,
            PendingStats { dataset: dialog.dataset, channel: dialog.channel, switch: dialog.switch },
        );
        tracing::info!(dataset = dialog.dataset, ?ticket, avg_period, stdev_period, "statistics requested");
        Ok(OutgoingStats { ticket, request })
    }

    /// Dismiss the dialog. Nothing was changed when it opened, so nothing
    /// needs restoring.
    pub fn cancel_periods(&mut self) -> DashResult<PeriodDialog> {
        let dialog = self.dialog.take().ok_or(DashError::NoDialog)?;
        tracing::debug!(dataset = dialog.dataset, channel = %dialog.channel, "period dialog cancelled");
        Ok(dialog)
    }

    /// Resolve the dialog from the dialog widget's answer: `None` means the
    /// user cancelled.
    pub fn resolve_periods(&mut self, answer: Option<(usize, usize)>) -> DashResult<OutgoingStats> {
        match answer {
            Some((avg, stdev)) => self.confirm_periods(avg, stdev),
            None => {
                self.cancel_periods()?;
                Err(DashError::DialogCancelled)
            }
        }
    }

    /// Apply a statistics response.
    ///
    /// Returns `Ok(false)` when the message is ignored: not a stats message,
    /// or a ticket that is unknown (its dataset was deleted meanwhile). A
    /// malformed payload registers nothing and lets the user ask again.
    pub fn handle_stats_response(&mut self, ticket: StatsTicket, message: BackendMessage) -> DashResult<bool> {
        let payload = match message {
            BackendMessage::Stats(payload) => payload,
            other => {
                tracing::debug!(?ticket, kind = other.kind(), "ignoring non-stats response");
                return Ok(false);
            }
        };
        let Some(pending) = self.in_flight.remove(&ticket) else {
            tracing::debug!(?ticket, "ignoring stale statistics response");
            return Ok(false);
        };
        let Some(ds) = self.datasets.get_mut(&pending.dataset) else {
            return Ok(false);
        };
        match ds.apply_stats(&payload, (pending.channel, pending.switch), &mut self.workspace, &mut self.ids) {
            Ok(()) => Ok(true),
            Err(e) => {
                tracing::warn!(?ticket, error = %e, "statistics response rejected");
                ds.abort_stats();
                Err(e)
            }
        }
    }

    /// The request behind `ticket` failed in transport.
    pub fn stats_failed(&mut self, ticket: StatsTicket, error: &DashError) {
        if let Some(pending) = self.in_flight.remove(&ticket) {
            tracing::warn!(?ticket, %error, "statistics request failed");
            if let Some(ds) = self.datasets.get_mut(&pending.dataset) {
                ds.abort_stats();
            }
        }
    }

    pub fn toggle_histogram(&mut self, dataset: DatasetId, channel: ChannelKey) -> DashResult<bool> {
        let ds = self.datasets.get_mut(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        ds.toggle_histogram(channel, &mut self.workspace, &mut self.ids)
    }

    pub fn normalize_x(&mut self, dataset: DatasetId, enable: bool) -> DashResult<bool> {
        let ds = self.datasets.get_mut(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        ds.normalize_x(enable, &mut self.workspace)
    }

    pub fn normalize_y(&mut self, dataset: DatasetId, enable: bool) -> DashResult<bool> {
        let ds = self.datasets.get_mut(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        ds.normalize_y(enable, &mut self.workspace)
    }

    pub fn set_style(&mut self, dataset: DatasetId, key: TraceKey, update: StyleUpdate) -> DashResult<()> {
        let ds = self.datasets.get(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        ds.set_style(key, update, &mut self.workspace)
    }

    /// Remove a dataset and all its traces. Any pending dialog or statistics
    /// request for it is dropped so a late response cannot resurrect traces.
    pub fn delete_dataset(&mut self, dataset: DatasetId) -> DashResult<usize> {
        let ds = self.datasets.remove(&dataset).ok_or(DashError::UnknownDataset(dataset))?;
        self.in_flight.retain(|_, p| p.dataset != dataset);
        if self.dialog.is_some_and(|d| d.dataset == dataset) {
            self.dialog = None;
        }
        Ok(ds.delete(&mut self.workspace))
    }

    pub fn mark_tab_mounted(&mut self, tab: TabId) -> DashResult<usize> {
        self.workspace.mark_mounted(tab)
    }

    pub fn switch_tab(&mut self, index: usize) -> DashResult<TabId> {
        self.workspace.switch_tab(index)
    }

    /// Whether `dataset` still has a statistics request outstanding.
    pub fn stats_pending(&self, dataset: DatasetId) -> bool {
        self.in_flight.values().any(|p| p.dataset == dataset)
    }
}
