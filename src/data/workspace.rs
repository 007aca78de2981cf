//! Workspace: the ordered set of tabs, each drawing one [`TraceRegistry`].
//!
//! Tabs are addressed by a stable [`TabId`] rather than their position.
//! A freshly created tab is not mounted yet: its plot surface appears a frame
//! later. Traces pushed before that are staged on the tab and only enter the
//! registry once [`Workspace::mark_mounted`] is called.

use std::collections::HashSet;
use std::fmt;

use crate::data::ids::TraceId;
use crate::data::trace_look::StyleUpdate;
use crate::data::traces::{Trace, TraceRegistry};
use crate::error::{DashError, DashResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Tab {
    id: TabId,
    pub title: String,
    registry: TraceRegistry,
    mounted: bool,
    staged: Vec<Trace>,
    layout_refresh: bool,
}

impl Tab {
    fn new(id: TabId, title: String, mounted: bool) -> Self {
        Self {
            id,
            title,
            registry: TraceRegistry::new(),
            mounted,
            staged: Vec::new(),
            layout_refresh: false,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn registry(&self) -> &TraceRegistry {
        &self.registry
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Traces waiting for the tab to mount.
    pub fn staged(&self) -> &[Trace] {
        &self.staged
    }

    pub fn contains(&self, id: TraceId) -> bool {
        self.registry.contains(id) || self.staged.iter().any(|t| t.id == id)
    }

    /// Look up a trace whether it is registered or still staged.
    pub fn trace(&self, id: TraceId) -> Option<&Trace> {
        self.registry
            .get(id)
            .or_else(|| self.staged.iter().find(|t| t.id == id))
    }

    /// Add a trace now, or stage it until the tab is mounted.
    pub fn push_trace(&mut self, trace: Trace) -> DashResult<()> {
        if self.contains(trace.id) {
            return Err(DashError::DuplicateTrace(trace.id));
        }
        if self.mounted {
            self.registry.insert(trace)
        } else if trace.x.len() != trace.y.len() {
            Err(DashError::ShapeMismatch {
                id: trace.id,
                x_len: trace.x.len(),
                y_len: trace.y.len(),
            })
        } else {
            self.staged.push(trace);
            Ok(())
        }
    }

    fn mount(&mut self) -> usize {
        self.mounted = true;
        let staged = std::mem::take(&mut self.staged);
        let n = staged.len();
        for trace in staged {
            if let Err(e) = self.registry.insert(trace) {
                tracing::warn!(tab = %self.id, error = %e, "dropping staged trace");
            }
        }
        n
    }

    fn staged_mut(&mut self, id: TraceId) -> Option<&mut Trace> {
        self.staged.iter_mut().find(|t| t.id == id)
    }

    pub fn toggle_visibility(&mut self, id: TraceId) -> DashResult<bool> {
        if let Some(t) = self.staged_mut(id) {
            t.look.visible = !t.look.visible;
            return Ok(t.look.visible);
        }
        self.registry.toggle_visibility(id)
    }

    pub fn set_style(&mut self, id: TraceId, update: StyleUpdate) -> DashResult<()> {
        if let Some(t) = self.staged_mut(id) {
            t.apply_style(update);
            return Ok(());
        }
        self.registry.set_style(id, update)
    }

    pub fn remove_many(&mut self, ids: &HashSet<TraceId>) -> usize {
        let before = self.staged.len();
        self.staged.retain(|t| !ids.contains(&t.id));
        (before - self.staged.len()) + self.registry.remove_many(ids)
    }

    pub fn set_axis_x(&mut self, ids: &[TraceId], new_x: &[f64]) -> DashResult<()> {
        let mut in_registry = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.staged_mut(id) {
                Some(t) => t.x = new_x.to_vec(),
                None => in_registry.push(id),
            }
        }
        self.registry.set_axis_x(&in_registry, new_x)
    }

    pub fn set_axis_y(&mut self, id: TraceId, new_y: Vec<f64>) -> DashResult<()> {
        if let Some(t) = self.staged_mut(id) {
            t.y = new_y;
            return Ok(());
        }
        self.registry.set_axis_y(id, new_y)
    }

    /// One-shot layout refresh raised when the tab becomes active.
    pub fn take_layout_refresh(&mut self) -> bool {
        std::mem::take(&mut self.layout_refresh)
    }
}

#[derive(Debug)]
pub struct Workspace {
    tabs: Vec<Tab>,
    active: usize,
    next_tab: u32,
}

impl Default for Workspace {
    /// A workspace with one mounted, empty tab.
    fn default() -> Self {
        Self {
            tabs: vec![Tab::new(TabId(0), "Tab0".to_string(), true)],
            active: 0,
            next_tab: 1,
        }
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tab, make it active and return its id. The tab starts unmounted.
    pub fn new_tab(&mut self, title: impl Into<String>) -> TabId {
        let id = TabId(self.next_tab);
        self.next_tab += 1;
        let title = title.into();
        tracing::debug!(tab = %id, %title, "new tab");
        self.tabs.push(Tab::new(id, title, false));
        self.active = self.tabs.len() - 1;
        id
    }

    /// Activate the tab at `index` and ask its surface to re-layout.
    pub fn switch_tab(&mut self, index: usize) -> DashResult<TabId> {
        let len = self.tabs.len();
        let tab = self
            .tabs
            .get_mut(index)
            .ok_or(DashError::TabIndexOutOfRange { index, len })?;
        tab.layout_refresh = true;
        self.active = index;
        Ok(tab.id)
    }

    /// The tab's plot surface exists; flush staged traces into its registry.
    pub fn mark_mounted(&mut self, id: TabId) -> DashResult<usize> {
        let tab = self.tab_mut(id).ok_or(DashError::UnknownTab(id))?;
        if tab.mounted {
            return Ok(0);
        }
        let flushed = tab.mount();
        tracing::debug!(tab = %id, flushed, "tab mounted");
        Ok(flushed)
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn tab_or_err(&mut self, id: TabId) -> DashResult<&mut Tab> {
        self.tab_mut(id).ok_or(DashError::UnknownTab(id))
    }

    pub fn registry(&self, id: TabId) -> Option<&TraceRegistry> {
        self.tab(id).map(|t| &t.registry)
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_id(&self) -> TabId {
        self.tabs[self.active].id
    }

    pub fn active_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
