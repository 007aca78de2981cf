//! Dataset: one uploaded sample and everything it placed on the workspace.
//!
//! A dataset never owns the [`Workspace`]; each operation borrows it (and the
//! [`IdAllocator`] when new traces are created) for the duration of the call.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::data::channel::{ChannelKey, ShownState, Switch, TraceKey};
use crate::data::ids::{IdAllocator, TraceId};
use crate::data::normalize::{normalize_values, shift_values};
use crate::data::sample::Sample;
use crate::data::trace_look::StyleUpdate;
use crate::data::traces::Trace;
use crate::data::workspace::{TabId, Workspace};
use crate::error::{DashError, DashResult};
use crate::protocol::{StatsPayload, StatsRequest};

pub type DatasetId = u64;

/// Tabs hosting this dataset's traces. `stdev` and `histogram` are created
/// on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetTabs {
    pub plot: TabId,
    pub stdev: Option<TabId>,
    pub histogram: Option<TabId>,
}

/// Result of a toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The trace changed visibility; `shown` is its new state.
    Toggled { shown: bool },
    /// Statistics have not been computed yet: the user must choose the
    /// averaging periods (each in `2..=max`) first.
    NeedsPeriods { max: usize },
}

#[derive(Debug)]
pub struct Dataset {
    id: DatasetId,
    sample: Sample,
    ids: BTreeMap<TraceKey, TraceId>,
    tabs: DatasetTabs,
    shown: BTreeMap<ChannelKey, ShownState>,
    /// Origin subtracted from X while normalized.
    x_origin: Option<f64>,
    normalized_y: bool,
    histograms: BTreeSet<ChannelKey>,
    /// Raw running averages, kept so Y normalization can be undone exactly.
    avgs: BTreeMap<ChannelKey, Vec<f64>>,
}

impl Dataset {
    /// Build a dataset from a parsed sample: assign one id per channel and
    /// register the primary traces on `plot_tab`.
    ///
    /// Data channels start visible; `timestamp_diffs` and `latencies` start
    /// hidden. Trace names are `"<channel> <sensor>"`.
    pub fn create(
        id: DatasetId,
        sample: Sample,
        alloc: &mut IdAllocator,
        workspace: &mut Workspace,
        plot_tab: TabId,
    ) -> DashResult<Self> {
        let tab = workspace.tab_or_err(plot_tab)?;
        let primary = alloc.assign_sample(&sample);

        let mut ids = BTreeMap::new();
        let mut shown = BTreeMap::new();
        let mut pushed = HashSet::new();
        for key in sample.channel_keys() {
            let (Some(&trace_id), Some(channel)) = (primary.get(&key), sample.channel(key)) else {
                continue;
            };
            let visible = key.is_data();
            let added = Trace::scatter(
                trace_id,
                format!("{} {}", key, sample.sensor_name),
                sample.timestamps.clone(),
                channel.data.clone(),
                visible,
            )
            .and_then(|t| tab.push_trace(t));
            if let Err(e) = added {
                tab.remove_many(&pushed);
                return Err(e);
            }
            pushed.insert(trace_id);
            ids.insert(TraceKey::primary(key), trace_id);
            shown.insert(key, ShownState::with_show(visible));
        }
        tracing::info!(
            dataset = id,
            sensor = %sample.sensor_name,
            channels = ids.len(),
            points = sample.len(),
            tab = %plot_tab,
            "dataset registered"
        );

        Ok(Self {
            id,
            sample,
            ids,
            tabs: DatasetTabs { plot: plot_tab, stdev: None, histogram: None },
            shown,
            x_origin: None,
            normalized_y: false,
            histograms: BTreeSet::new(),
            avgs: BTreeMap::new(),
        })
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn name(&self) -> &str {
        &self.sample.sensor_name
    }

    pub fn tabs(&self) -> DatasetTabs {
        self.tabs
    }

    pub fn channel_keys(&self) -> impl Iterator<Item = ChannelKey> + '_ {
        self.shown.keys().copied()
    }

    pub fn shown(&self, channel: ChannelKey) -> Option<ShownState> {
        self.shown.get(&channel).copied()
    }

    pub fn trace_id(&self, key: TraceKey) -> Option<TraceId> {
        self.ids.get(&key).copied()
    }

    /// Every trace key this dataset owns, with its id.
    pub fn trace_ids(&self) -> impl Iterator<Item = (TraceKey, TraceId)> + '_ {
        self.ids.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_normalized_x(&self) -> bool {
        self.x_origin.is_some()
    }

    pub fn x_origin(&self) -> Option<f64> {
        self.x_origin
    }

    pub fn is_normalized_y(&self) -> bool {
        self.normalized_y
    }

    pub fn histogram_generated(&self, channel: ChannelKey) -> bool {
        self.histograms.contains(&channel)
    }

    /// Statistics have been requested (the stdev tab exists).
    pub fn has_stats_tab(&self) -> bool {
        self.tabs.stdev.is_some()
    }

    /// Where the trace for `key` lives, if it exists.
    pub fn trace_location(&self, key: TraceKey) -> Option<(TabId, TraceId)> {
        let id = self.trace_id(key)?;
        Some((self.tab_for(key.switch)?, id))
    }

    fn tab_for(&self, switch: Switch) -> Option<TabId> {
        match switch {
            Switch::Show | Switch::Avg => Some(self.tabs.plot),
            Switch::Stdev => self.tabs.stdev,
            Switch::Histogram => self.tabs.histogram,
        }
    }

    fn ensure_channel(&self, channel: ChannelKey) -> DashResult<()> {
        if self.shown.contains_key(&channel) {
            Ok(())
        } else {
            Err(DashError::UnknownChannel(channel))
        }
    }

    /// X values as currently displayed (shifted while normalized).
    fn display_x(&self) -> Vec<f64> {
        match self.x_origin {
            Some(origin) => shift_values(&self.sample.timestamps, -origin),
            None => self.sample.timestamps.clone(),
        }
    }

    /// Y values for `channel` as currently displayed.
    fn display_y(&self, channel: ChannelKey, values: &[f64]) -> Vec<f64> {
        match (self.normalized_y, self.sample.channel(channel)) {
            (true, Some(ch)) => normalize_values(values, ch.min, ch.max),
            _ => values.to_vec(),
        }
    }

    /// Flip one of a channel's traces.
    ///
    /// Avg/Stdev before any statistics exist returns
    /// [`ToggleOutcome::NeedsPeriods`] and changes nothing.
    pub fn toggle_trace(
        &mut self,
        channel: ChannelKey,
        switch: Switch,
        workspace: &mut Workspace,
        alloc: &mut IdAllocator,
    ) -> DashResult<ToggleOutcome> {
        self.ensure_channel(channel)?;
        if switch == Switch::Histogram {
            let shown = self.toggle_histogram(channel, workspace, alloc)?;
            return Ok(ToggleOutcome::Toggled { shown });
        }
        if switch.is_stat() && self.tabs.stdev.is_none() {
            return Ok(ToggleOutcome::NeedsPeriods { max: self.sample.len() });
        }

        let key = TraceKey::new(channel, switch);
        let Some(id) = self.trace_id(key) else {
            // Stats tab exists but the response has not landed yet.
            return Err(DashError::StatsPending(self.id));
        };
        let tab_id = self.tab_for(switch).ok_or(DashError::UnknownTrace(id))?;
        let shown = workspace.tab_or_err(tab_id)?.toggle_visibility(id)?;
        if let Some(state) = self.shown.get_mut(&channel) {
            state.set(switch, shown);
        }
        tracing::debug!(dataset = self.id, trace = %key, shown, "toggled");
        Ok(ToggleOutcome::Toggled { shown })
    }

    /// Statistics request covering every channel of the sample.
    pub fn stats_request(&self, avg_period: usize, stdev_period: usize) -> StatsRequest {
        let channels = self
            .sample
            .channel_keys()
            .into_iter()
            .filter_map(|k| self.sample.channel(k).map(|c| (k, c.data.clone())))
            .collect();
        StatsRequest { avg_period, stdev_period, channels }
    }

    /// Record the tab that will receive the stdev traces.
    pub fn begin_stats(&mut self, stdev_tab: TabId) {
        self.tabs.stdev = Some(stdev_tab);
    }

    /// Forget a stats request that will never complete.
    pub fn abort_stats(&mut self) {
        if !self.ids.keys().any(|k| k.switch.is_stat()) {
            self.tabs.stdev = None;
        }
    }

    /// Register the averages (on the plot tab) and standard deviations (on
    /// the stdev tab), all hidden except the `requested` one.
    ///
    /// The response is validated up front; on error nothing is registered.
    pub fn apply_stats(
        &mut self,
        payload: &StatsPayload,
        requested: (ChannelKey, Switch),
        workspace: &mut Workspace,
        alloc: &mut IdAllocator,
    ) -> DashResult<()> {
        let keys = self.sample.channel_keys();
        payload.validate(&keys, self.sample.len())?;
        let stdev_tab = self
            .tabs
            .stdev
            .ok_or_else(|| DashError::MalformedResponse("no statistics were requested".into()))?;
        if workspace.tab(stdev_tab).is_none() {
            return Err(DashError::UnknownTab(stdev_tab));
        }
        if workspace.tab(self.tabs.plot).is_none() {
            return Err(DashError::UnknownTab(self.tabs.plot));
        }

        let x = self.display_x();
        for key in keys {
            let (Some(avg), Some(stdev)) = (payload.avgs.get(&key), payload.stdevs.get(&key)) else {
                continue;
            };
            let avg_key = TraceKey::new(key, Switch::Avg);
            let stdev_key = TraceKey::new(key, Switch::Stdev);
            let avg_visible = requested == (key, Switch::Avg);
            let stdev_visible = requested == (key, Switch::Stdev);

            let avg_id = alloc.next();
            let avg_trace = Trace::scatter(
                avg_id,
                format!("{} {} running avg", key, self.sample.sensor_name),
                x.clone(),
                self.display_y(key, avg),
                avg_visible,
            )?;
            workspace.tab_or_err(self.tabs.plot)?.push_trace(avg_trace)?;
            self.ids.insert(avg_key, avg_id);
            self.avgs.insert(key, avg.clone());

            let stdev_id = alloc.next();
            let stdev_trace = Trace::scatter(
                stdev_id,
                format!("{} {} stdev", key, self.sample.sensor_name),
                x.clone(),
                stdev.clone(),
                stdev_visible,
            )?;
            workspace.tab_or_err(stdev_tab)?.push_trace(stdev_trace)?;
            self.ids.insert(stdev_key, stdev_id);

            if let Some(state) = self.shown.get_mut(&key) {
                state.avg = avg_visible;
                state.stdev = stdev_visible;
            }
        }
        tracing::info!(dataset = self.id, tab = %stdev_tab, "statistics registered");
        Ok(())
    }

    /// Show/hide the channel's histogram, creating it (and the histogram tab)
    /// on first use. Returns the new visibility.
    pub fn toggle_histogram(
        &mut self,
        channel: ChannelKey,
        workspace: &mut Workspace,
        alloc: &mut IdAllocator,
    ) -> DashResult<bool> {
        self.ensure_channel(channel)?;
        let key = TraceKey::new(channel, Switch::Histogram);

        let shown = match (self.histograms.contains(&channel), self.trace_id(key), self.tabs.histogram) {
            (true, Some(id), Some(tab)) => workspace.tab_or_err(tab)?.toggle_visibility(id)?,
            _ => {
                let tab = match self.tabs.histogram {
                    Some(tab) if workspace.tab(tab).is_some() => tab,
                    _ => {
                        let tab = workspace.new_tab(format!("{} histograms", self.sample.sensor_name));
                        self.tabs.histogram = Some(tab);
                        tab
                    }
                };
                let values = self
                    .sample
                    .channel(channel)
                    .map(|c| c.data.clone())
                    .ok_or(DashError::UnknownChannel(channel))?;
                let id = alloc.next();
                let trace = Trace::histogram(
                    id,
                    format!("{} {} histogram", channel, self.sample.sensor_name),
                    self.display_x(),
                    values,
                    true,
                )?;
                workspace.tab_or_err(tab)?.push_trace(trace)?;
                self.ids.insert(key, id);
                self.histograms.insert(channel);
                true
            }
        };
        if let Some(state) = self.shown.get_mut(&channel) {
            state.histogram = shown;
        }
        Ok(shown)
    }

    /// This dataset's trace ids grouped by the tab that hosts them.
    pub fn ids_by_tab(&self) -> BTreeMap<TabId, Vec<TraceId>> {
        let mut out: BTreeMap<TabId, Vec<TraceId>> = BTreeMap::new();
        for (key, id) in &self.ids {
            if let Some(tab) = self.tab_for(key.switch) {
                out.entry(tab).or_default().push(*id);
            }
        }
        out
    }

    /// Shift every owned trace so the first timestamp becomes 0, or undo it.
    ///
    /// Returns `false` when already in the requested state. Undoing restores
    /// the original timestamps exactly.
    pub fn normalize_x(&mut self, enable: bool, workspace: &mut Workspace) -> DashResult<bool> {
        if enable == self.x_origin.is_some() {
            return Ok(false);
        }
        let new_x = if enable {
            let origin = self.sample.timestamps.first().copied().unwrap_or(0.0);
            self.x_origin = Some(origin);
            shift_values(&self.sample.timestamps, -origin)
        } else {
            self.x_origin = None;
            self.sample.timestamps.clone()
        };
        for (tab, ids) in self.ids_by_tab() {
            match workspace.tab_mut(tab) {
                Some(tab) => tab.set_axis_x(&ids, &new_x)?,
                None => tracing::debug!(dataset = self.id, %tab, "tab gone, skipping X update"),
            }
        }
        Ok(true)
    }

    /// Rescale each channel's primary and average traces onto `[-1, 1]`
    /// using that channel's own min/max, or undo it.
    ///
    /// Returns `false` when already in the requested state.
    pub fn normalize_y(&mut self, enable: bool, workspace: &mut Workspace) -> DashResult<bool> {
        if enable == self.normalized_y {
            return Ok(false);
        }
        self.normalized_y = enable;
        for key in self.sample.channel_keys() {
            let Some(channel) = self.sample.channel(key) else {
                continue;
            };
            let mut updates = Vec::with_capacity(2);
            if let Some(id) = self.trace_id(TraceKey::primary(key)) {
                updates.push((id, self.display_y(key, &channel.data)));
            }
            if let (Some(id), Some(avg)) =
                (self.trace_id(TraceKey::new(key, Switch::Avg)), self.avgs.get(&key))
            {
                updates.push((id, self.display_y(key, avg)));
            }
            if let Some(tab) = workspace.tab_mut(self.tabs.plot) {
                for (id, y) in updates {
                    tab.set_axis_y(id, y)?;
                }
            }
        }
        Ok(true)
    }

    /// Restyle one of this dataset's traces wherever it lives.
    pub fn set_style(&self, key: TraceKey, update: StyleUpdate, workspace: &mut Workspace) -> DashResult<()> {
        let id = self.trace_id(key).ok_or(DashError::UnknownChannel(key.channel))?;
        let tab = self.tab_for(key.switch).ok_or(DashError::UnknownTrace(id))?;
        workspace.tab_or_err(tab)?.set_style(id, update)
    }

    /// Remove every trace this dataset placed anywhere. Tabs that no longer
    /// exist are already clean. Returns the number of traces removed.
    pub fn delete(self, workspace: &mut Workspace) -> usize {
        let all: HashSet<TraceId> = self.ids.values().copied().collect();
        let mut tabs: BTreeSet<TabId> = BTreeSet::new();
        tabs.insert(self.tabs.plot);
        tabs.extend(self.tabs.stdev);
        tabs.extend(self.tabs.histogram);

        let mut removed = 0;
        for tab in tabs {
            if let Some(tab) = workspace.tab_mut(tab) {
                removed += tab.remove_many(&all);
            }
        }
        tracing::info!(dataset = self.id, removed, "dataset deleted");
        removed
    }
}
