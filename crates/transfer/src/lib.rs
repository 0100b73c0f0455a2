//! Chunked file reading and file-stability detection.
//!
//! A file is read in fixed-size windows by [`ChunkReader`]; the last window is
//! detected from the read itself, never from a size taken up front, since the
//! source may still be growing. [`StabilityGate`] holds an upload back until
//! no other process has the file locked.

mod chunked;
mod stability;
mod types;

pub use chunked::ChunkReader;
pub use stability::{STABILITY_POLL_INTERVAL, StabilityGate};
pub use types::{Chunk, UploadSession};

pub use monarch_protocol::CHUNK_SIZE;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
