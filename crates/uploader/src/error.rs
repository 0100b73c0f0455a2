//! Upload error types.

use std::path::PathBuf;

/// Errors that end an upload attempt.
///
/// None of these are retried. Chunk-level variants name the chunk that
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk {chunk_index}: network error: {source}")]
    Network {
        chunk_index: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("chunk {chunk_index}: unexpected response: {reason}")]
    Protocol { chunk_index: u64, reason: String },
}

impl UploadError {
    /// Index of the chunk that failed, if the failure happened mid-stream.
    pub fn chunk_index(&self) -> Option<u64> {
        match self {
            UploadError::Io { .. } => None,
            UploadError::Network { chunk_index, .. } | UploadError::Protocol { chunk_index, .. } => {
                Some(*chunk_index)
            }
        }
    }

    /// True if the file was gone before it could be read, as with the temp
    /// file of an atomic save.
    pub fn is_vanished(&self) -> bool {
        matches!(self, UploadError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        UploadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
