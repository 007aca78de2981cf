//! Renderable traces and the per-tab registry that owns them.

use std::collections::{HashMap, HashSet};

use crate::data::ids::TraceId;
use crate::data::trace_look::{PlotMode, StyleUpdate, TraceLook};
use crate::error::{DashError, DashResult};

/// How the renderer draws a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Scatter,
    /// Binned by the renderer from the `y` values.
    Histogram,
}

/// One renderable series.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub id: TraceId,
    pub name: String,
    pub kind: TraceKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub look: TraceLook,
}

impl Trace {
    /// Build a scatter trace. Fails with `ShapeMismatch` when `x` and `y`
    /// differ in length.
    pub fn scatter(
        id: TraceId,
        name: impl Into<String>,
        x: Vec<f64>,
        y: Vec<f64>,
        visible: bool,
    ) -> DashResult<Self> {
        if x.len() != y.len() {
            return Err(DashError::ShapeMismatch { id, x_len: x.len(), y_len: y.len() });
        }
        let mut look = TraceLook::new(id as usize);
        look.visible = visible;
        Ok(Self { id, name: name.into(), kind: TraceKind::Scatter, x, y, look })
    }

    /// Build a histogram trace over `values`; `x` keeps the matching timestamps.
    pub fn histogram(
        id: TraceId,
        name: impl Into<String>,
        x: Vec<f64>,
        values: Vec<f64>,
        visible: bool,
    ) -> DashResult<Self> {
        let mut trace = Self::scatter(id, name, x, values, visible)?;
        trace.kind = TraceKind::Histogram;
        trace.look.mode = None;
        Ok(trace)
    }

    pub fn visible(&self) -> bool {
        self.look.visible
    }

    /// Apply a partial style change.
    ///
    /// Switching to `Histogram` drops the scatter mode; switching a histogram
    /// back to `Scatter` restores `Markers`. A bare `mode` on a histogram
    /// turns it back into a scatter trace with that mode.
    pub fn apply_style(&mut self, update: StyleUpdate) {
        if let Some(kind) = update.kind {
            match (self.kind, kind) {
                (TraceKind::Scatter, TraceKind::Histogram) => {
                    self.kind = TraceKind::Histogram;
                    self.look.mode = None;
                }
                (TraceKind::Histogram, TraceKind::Scatter) => {
                    self.kind = TraceKind::Scatter;
                    self.look.mode = Some(PlotMode::Markers);
                }
                _ => {}
            }
        }
        if let Some(mode) = update.mode {
            if update.kind != Some(TraceKind::Histogram) {
                self.kind = TraceKind::Scatter;
                self.look.mode = Some(mode);
            }
        }
        if let Some(marker) = update.marker {
            self.look.marker = marker;
        }
        if let Some(color) = update.color {
            self.look.color = color;
        }
    }
}

/// All traces drawn on one tab, in insertion order.
///
/// Keeps an `id -> position` lookup so visibility and style changes do not
/// scan the list.
#[derive(Debug, Default)]
pub struct TraceRegistry {
    traces: Vec<Trace>,
    index: HashMap<TraceId, usize>,
}

impl TraceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scatter trace built from raw arrays.
    pub fn add_trace(
        &mut self,
        x: Vec<f64>,
        y: Vec<f64>,
        id: TraceId,
        name: impl Into<String>,
        initially_visible: bool,
    ) -> DashResult<()> {
        let trace = Trace::scatter(id, name, x, y, initially_visible)?;
        self.insert(trace)
    }

    /// Register an already built trace.
    pub fn insert(&mut self, trace: Trace) -> DashResult<()> {
        if self.index.contains_key(&trace.id) {
            return Err(DashError::DuplicateTrace(trace.id));
        }
        if trace.x.len() != trace.y.len() {
            return Err(DashError::ShapeMismatch {
                id: trace.id,
                x_len: trace.x.len(),
                y_len: trace.y.len(),
            });
        }
        self.index.insert(trace.id, self.traces.len());
        self.traces.push(trace);
        Ok(())
    }

    pub fn get(&self, id: TraceId) -> Option<&Trace> {
        self.index.get(&id).map(|&i| &self.traces[i])
    }

    pub fn get_mut(&mut self, id: TraceId) -> Option<&mut Trace> {
        match self.index.get(&id) {
            Some(&i) => Some(&mut self.traces[i]),
            None => None,
        }
    }

    fn get_mut_or_err(&mut self, id: TraceId) -> DashResult<&mut Trace> {
        self.get_mut(id).ok_or(DashError::UnknownTrace(id))
    }

    pub fn contains(&self, id: TraceId) -> bool {
        self.index.contains_key(&id)
    }

    /// Flip visibility; returns the new state.
    pub fn toggle_visibility(&mut self, id: TraceId) -> DashResult<bool> {
        let trace = self.get_mut_or_err(id)?;
        trace.look.visible = !trace.look.visible;
        Ok(trace.look.visible)
    }

    pub fn set_visible(&mut self, id: TraceId, visible: bool) -> DashResult<()> {
        self.get_mut_or_err(id)?.look.visible = visible;
        Ok(())
    }

    pub fn set_style(&mut self, id: TraceId, update: StyleUpdate) -> DashResult<()> {
        self.get_mut_or_err(id)?.apply_style(update);
        Ok(())
    }

    /// Delete every trace whose id is in `ids`; returns how many were removed.
    ///
    /// Removal shifts positions, so the lookup is rebuilt from scratch after
    /// the filter rather than patched during it.
    pub fn remove_many(&mut self, ids: &HashSet<TraceId>) -> usize {
        let before = self.traces.len();
        self.traces.retain(|t| !ids.contains(&t.id));
        self.reindex();
        before - self.traces.len()
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, t) in self.traces.iter().enumerate() {
            self.index.insert(t.id, i);
        }
    }

    /// Replace the X values of several traces that share one axis.
    ///
    /// Known ids are all updated; the first unknown id is reported afterwards.
    pub fn set_axis_x(&mut self, ids: &[TraceId], new_x: &[f64]) -> DashResult<()> {
        let mut missing = None;
        for &id in ids {
            match self.get_mut(id) {
                Some(trace) => trace.x = new_x.to_vec(),
                None => {
                    missing.get_or_insert(id);
                }
            }
        }
        match missing {
            Some(id) => Err(DashError::UnknownTrace(id)),
            None => Ok(()),
        }
    }

    pub fn set_axis_y(&mut self, id: TraceId, new_y: Vec<f64>) -> DashResult<()> {
        self.get_mut_or_err(id)?.y = new_y;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter()
    }

    pub fn ids(&self) -> Vec<TraceId> {
        self.traces.iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}
