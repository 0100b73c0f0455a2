//! Data types for the upload flow.

use std::path::PathBuf;

use monarch_protocol::TerminalOutcome;

/// Settings snapshot taken when an upload starts.
///
/// Owned by the upload so later settings edits never reach a running
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSettings {
    pub secret: String,
    pub private: bool,
}

/// Progress event emitted during an upload.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// The file is stable and the first chunk is about to be read.
    Started { path: PathBuf },
    /// A chunk was acknowledged by the service.
    ChunkSent {
        path: PathBuf,
        chunk_index: u64,
        bytes: usize,
        last: bool,
    },
    /// The terminal chunk was answered (accepted or rejected).
    Completed {
        path: PathBuf,
        outcome: TerminalOutcome,
    },
    /// The upload stopped on an error.
    Failed { path: PathBuf, error: String },
}
