//! Application orchestrator: wires the watcher, uploader and notifier.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use monarch_client::UploadClient;
use monarch_notifier::{LogNotifier, Notification, Notifier};
use monarch_uploader::ChunkUploader;
use monarch_watcher::{Pipeline, PipelineFuture, WatchDispatcher, run_dispatch};
use tokio_util::sync::CancellationToken;

use crate::config::Config;

/// Runs the agent until shutdown is requested.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let watch_dir = config.watch_dir()?;

    let client = UploadClient::new(&config.client_config()).context("building HTTP client")?;
    tracing::info!(endpoint = client.endpoint(), "upload client ready");

    let settings = Arc::new(RwLock::new(config));
    let pipeline = UploadPipeline {
        uploader: ChunkUploader::new(Arc::new(client)),
        settings: Arc::clone(&settings),
        notifier: Arc::new(LogNotifier),
    };

    let mut dispatcher = WatchDispatcher::new(&watch_dir)?;
    let events = dispatcher
        .take_events()
        .context("watch event receiver already taken")?;

    let cancel = CancellationToken::new();
    let dispatch = tokio::spawn({
        let cancel = cancel.clone();
        async move { run_dispatch(events, &pipeline, cancel).await }
    });

    tracing::info!("agent ready");

    let mut reload = ReloadSignal::new()?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("SIGINT received, shutting down");
                break;
            }
            _ = reload.recv() => {
                match Config::load().and_then(|fresh| apply_reload(&settings, &dispatcher, fresh)) {
                    Ok(()) => tracing::info!("configuration reloaded"),
                    Err(e) => tracing::error!("reload failed: {e:#}"),
                }
            }
        }
    }

    // An upload in progress runs to completion before the loop exits.
    cancel.cancel();
    let dispatched = dispatch.await.context("dispatch task panicked")?;
    tracing::info!(dispatched, "dispatch loop finished");

    Ok(())
}

/// Swaps in a freshly loaded configuration.
///
/// Secret and privacy take effect from the next upload; a new watch folder
/// is switched immediately. Connection settings need a restart.
fn apply_reload(
    settings: &RwLock<Config>,
    dispatcher: &WatchDispatcher,
    fresh: Config,
) -> anyhow::Result<()> {
    let mut current = settings.write().unwrap_or_else(|e| e.into_inner());

    if fresh.watch_path != current.watch_path {
        let dir = fresh.watch_dir()?;
        dispatcher.set_root(&dir)?;
    }
    if fresh.base_url != current.base_url
        || fresh.request_timeout_secs != current.request_timeout_secs
    {
        tracing::warn!("connection settings changed; restart the agent to apply them");
    }

    *current = fresh;
    Ok(())
}

/// Uploads each dispatched file and reports the result.
struct UploadPipeline {
    uploader: ChunkUploader,
    settings: Arc<RwLock<Config>>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline for UploadPipeline {
    fn handle<'a>(&'a self, path: &'a Path) -> PipelineFuture<'a> {
        Box::pin(async move {
            let upload = self
                .settings
                .read()
                .unwrap_or_else(|e| e.into_inner())
                .upload_settings();

            let notification = match self.uploader.process(path, &upload).await {
                Ok(outcome) => Notification::from_outcome(&outcome),
                Err(e) if e.is_vanished() => {
                    tracing::debug!(path = %path.display(), "file vanished before upload");
                    return;
                }
                Err(e) => Notification::failure(e.to_string()),
            };
            self.notifier.notify(notification);
        })
    }
}

/// SIGHUP on Unix; never fires elsewhere.
struct ReloadSignal {
    #[cfg(unix)]
    inner: Option<tokio::signal::unix::Signal>,
}

impl ReloadSignal {
    fn new() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            Ok(Self {
                inner: Some(signal(SignalKind::hangup())?),
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        if let Some(sig) = self.inner.as_mut() {
            if sig.recv().await.is_some() {
                return;
            }
            self.inner = None;
        }
        std::future::pending::<()>().await
    }
}
