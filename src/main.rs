use sensordash::{run_dashboard, DashboardConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "sensordash=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut cfg = DashboardConfig::default();
    if let Ok(url) = std::env::var("SENSORDASH_SERVER") {
        cfg.server_url = url;
    }
    if std::env::var_os("SENSORDASH_LOCAL_STATS").is_some() {
        cfg.local_stats = true;
    }
    tracing::info!(server = %cfg.server_url, local_stats = cfg.local_stats, "sensordash starting");
    run_dashboard(cfg)
}
