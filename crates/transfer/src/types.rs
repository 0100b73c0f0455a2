use std::path::{Path, PathBuf};

use crate::{CHUNK_SIZE, TransferError};

/// One window of a source file.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Position in the upload sequence, starting at 0.
    pub index: u64,
    /// Byte offset within the file (`index * chunk_size`).
    pub offset: u64,
    /// Raw chunk data. Shorter than the window only for the last chunk.
    pub data: Vec<u8>,
    /// True if the read reached end-of-file.
    pub last: bool,
}

impl Chunk {
    /// Size of this chunk in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// State of a single file's upload.
///
/// Owned by one upload invocation; never shared between concurrent uploads.
/// The secret and private flag are copied in at creation so a settings change
/// mid-upload cannot affect the remaining chunks.
#[derive(Debug, Clone)]
pub struct UploadSession {
    id: String,
    file_path: PathBuf,
    file_name: String,
    secret: String,
    private: bool,
    chunk_size: usize,
    chunk_index: u64,
    is_last_chunk: bool,
    bytes_sent: u64,
}

impl UploadSession {
    /// Creates a session for `path`.
    ///
    /// If `chunk_size` is 0, [`CHUNK_SIZE`] is used.
    pub fn new(
        path: &Path,
        secret: impl Into<String>,
        private: bool,
        chunk_size: usize,
    ) -> Result<Self, TransferError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TransferError::InvalidPath(path.display().to_string()))?;

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: path.to_path_buf(),
            file_name,
            secret: secret.into(),
            private,
            chunk_size: if chunk_size == 0 {
                CHUNK_SIZE
            } else {
                chunk_size
            },
            chunk_index: 0,
            is_last_chunk: false,
            bytes_sent: 0,
        })
    }

    /// Records a sent chunk of `bytes` bytes and advances the index.
    pub fn record_chunk(&mut self, bytes: usize, last: bool) {
        self.bytes_sent += bytes as u64;
        self.is_last_chunk = last;
        self.chunk_index += 1;
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Base name sent as the multipart filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn private(&self) -> bool {
        self.private
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Index of the next chunk to send.
    pub fn chunk_index(&self) -> u64 {
        self.chunk_index
    }

    pub fn is_last_chunk(&self) -> bool {
        self.is_last_chunk
    }

    /// Number of chunks recorded so far.
    pub fn chunks_sent(&self) -> u64 {
        self.chunk_index
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }
}
