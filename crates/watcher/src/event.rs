use std::path::PathBuf;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

/// Kind of change that makes a file eligible for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Write,
}

/// A change to a file in the watched folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: WatchEventKind,
}

impl WatchEvent {
    /// Maps a `notify` event to one `WatchEvent` per affected path.
    ///
    /// Creations become `Create`. Content and rename-into-place changes become
    /// `Write`. Removals, access, metadata-only changes and the source side of
    /// a rename are ignored.
    pub fn from_notify(event: &Event) -> Vec<WatchEvent> {
        let kind = match event.kind {
            EventKind::Create(_) => WatchEventKind::Create,
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => return Vec::new(),
            EventKind::Modify(_) => WatchEventKind::Write,
            _ => return Vec::new(),
        };

        // A two-path rename event lists the destination last.
        let paths: &[PathBuf] = match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                event.paths.last().map(std::slice::from_ref).unwrap_or(&[])
            }
            _ => &event.paths,
        };

        paths
            .iter()
            .map(|path| WatchEvent {
                path: path.clone(),
                kind,
            })
            .collect()
    }
}
