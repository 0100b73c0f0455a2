//! Watcher setup and the single upload-dispatch loop.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::dedup::PathDeduplicator;
use crate::event::WatchEvent;

/// Errors from watcher setup.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Boxed future returned by [`Pipeline::handle`].
pub type PipelineFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Work to run for each dispatched file.
///
/// The returned future is awaited to completion before the next event is
/// taken off the queue.
pub trait Pipeline: Send + Sync {
    fn handle<'a>(&'a self, path: &'a Path) -> PipelineFuture<'a>;
}

struct WatchState {
    watcher: RecommendedWatcher,
    paths: Vec<PathBuf>,
}

/// Watches one folder and queues file events for [`run_dispatch`].
///
/// The watched-path set is guarded by a mutex so the folder can be switched
/// from another task while events are being consumed.
pub struct WatchDispatcher {
    state: Mutex<WatchState>,
    events_rx: Option<mpsc::UnboundedReceiver<WatchEvent>>,
}

impl WatchDispatcher {
    /// Starts watching `root` (non-recursively).
    pub fn new(root: &Path) -> Result<Self, WatchError> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for ev in WatchEvent::from_notify(&event) {
                        if ev.path.is_dir() {
                            continue;
                        }
                        trace!(path = %ev.path.display(), kind = ?ev.kind, "file event");
                        let _ = events_tx.send(ev);
                    }
                }
                Err(e) => warn!(error = %e, "watcher error"),
            },
            Config::default(),
        )?;

        let dispatcher = Self {
            state: Mutex::new(WatchState {
                watcher,
                paths: Vec::new(),
            }),
            events_rx: Some(events_rx),
        };
        dispatcher.set_root(root)?;
        Ok(dispatcher)
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<WatchEvent>> {
        self.events_rx.take()
    }

    /// Replaces the watched folder.
    ///
    /// Every previously watched path is removed before `root` is added. On
    /// error the old folder is no longer watched.
    pub fn set_root(&self, root: &Path) -> Result<(), WatchError> {
        if !root.is_dir() {
            return Err(WatchError::NotADirectory(root.to_path_buf()));
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let previous: Vec<PathBuf> = state.paths.drain(..).collect();
        for path in previous {
            if let Err(e) = state.watcher.unwatch(&path) {
                warn!(path = %path.display(), error = %e, "failed to unwatch");
            }
        }

        state.watcher.watch(root, RecursiveMode::NonRecursive)?;
        state.paths.push(root.to_path_buf());
        info!(path = %root.display(), "watching folder");
        Ok(())
    }

    /// Snapshot of the watched paths.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .paths
            .clone()
    }
}

/// Consumes `events` one at a time until the channel closes or `cancel` fires.
///
/// Consecutive events for the same path are dispatched once. Cancellation is
/// only observed between files: a pipeline run in progress always finishes.
/// Returns the number of dispatched files.
pub async fn run_dispatch<P>(
    mut events: mpsc::UnboundedReceiver<WatchEvent>,
    pipeline: &P,
    cancel: CancellationToken,
) -> usize
where
    P: Pipeline + ?Sized,
{
    let mut dedup = PathDeduplicator::new();
    let mut dispatched = 0;

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            ev = events.recv() => match ev {
                Some(ev) => ev,
                None => break,
            },
        };

        if !dedup.should_dispatch(&event.path) {
            trace!(path = %event.path.display(), "duplicate event skipped");
            continue;
        }

        debug!(path = %event.path.display(), kind = ?event.kind, "dispatching");
        pipeline.handle(&event.path).await;
        dispatched += 1;
    }

    debug!(dispatched, "dispatch loop stopped");
    dispatched
}
