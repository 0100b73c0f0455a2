//! `monarch-agent`: watches a folder and uploads every new file.

mod app;
mod config;

use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let path = config::config_path()?;
    let config = config::Config::load_from(&path)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        watch_path = %config.watch_path,
        private = config.private,
        "monarch agent starting"
    );

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("monarch-agent")
        .build()?
        .block_on(app::run(config))?;

    tracing::info!("monarch agent stopped");
    Ok(())
}
