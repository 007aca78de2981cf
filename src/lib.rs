//! sensordash crate root: re-exports and module wiring.
//!
//! An egui/eframe dashboard for uploaded sensor samples:
//! - `data`: ids, samples, traces, the tabbed workspace and datasets
//! - `protocol`: messages exchanged with the parsing/statistics backend
//! - `session`: applies backend responses and user actions to the workspace
//! - `backend`: HTTP worker thread
//! - `app` / `panels`: the window and its widgets

pub mod app;
pub mod backend;
pub mod config;
pub mod data;
pub mod error;
pub mod panels;
pub mod protocol;
pub mod session;

// Public re-exports for a compact external API
pub use app::{run_dashboard, DashboardApp};
pub use config::DashboardConfig;
pub use data::channel::{ChannelKey, Switch, TraceKey};
pub use data::dataset::{Dataset, DatasetId, ToggleOutcome};
pub use data::ids::{IdAllocator, TraceId};
pub use data::sample::Sample;
pub use data::traces::{Trace, TraceKind, TraceRegistry};
pub use data::workspace::{Tab, TabId, Workspace};
pub use error::{DashError, DashResult};
pub use protocol::{BackendMessage, StatsPayload, StatsRequest};
pub use session::{OutgoingStats, PeriodDialog, SessionController, StatsTicket};
