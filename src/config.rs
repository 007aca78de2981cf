//! Configuration for the dashboard window and its backend connection.

use std::time::Duration;

/// Everything the dashboard needs to start.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    // ── Window / chrome ──────────────────────────────────────────────────────
    /// Native window title.
    pub title: String,
    /// Initial inner window size in points.
    pub window_size: [f32; 2],

    // ── Backend ──────────────────────────────────────────────────────────────
    /// Base URL of the parsing/statistics service. `upload` and `stats` are
    /// joined onto it.
    pub server_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Answer statistics requests in-process instead of calling `/stats`.
    pub local_stats: bool,

    // ── Behaviour ────────────────────────────────────────────────────────────
    /// Place each upload on a fresh tab instead of the active one.
    pub upload_into_new_tab: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Sensor Dashboard".to_string(),
            window_size: [1400.0, 900.0],
            server_url: "http://localhost:5000/".to_string(),
            request_timeout: Duration::from_secs(60),
            local_stats: false,
            upload_into_new_tab: false,
        }
    }
}

impl DashboardConfig {
    /// `server_url` joined with `path`, with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
