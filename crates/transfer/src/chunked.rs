use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::types::Chunk;
use crate::{CHUNK_SIZE, TransferError};

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Reads a file in fixed-size windows addressed by chunk index.
///
/// Chunk `i` always covers the bytes starting at `i * chunk_size`, so windows
/// are contiguous and never overlap even if the file grows between reads.
pub struct ChunkReader {
    file: std::fs::File,
    chunk_size: usize,
    next_index: u64,
    finished: bool,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    ///
    /// If `chunk_size` is 0, [`CHUNK_SIZE`] is used.
    pub fn new(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let chunk_size = if chunk_size == 0 {
            CHUNK_SIZE
        } else {
            chunk_size
        };
        Ok(Self {
            file,
            chunk_size,
            next_index: 0,
            finished: false,
        })
    }

    /// Reads the chunk at `index`.
    ///
    /// The chunk is marked last when the read comes back short. A read that
    /// fills the window exactly probes one byte further: if the file ends
    /// there, the window is the last one.
    pub fn read_chunk(&mut self, index: u64) -> Result<Chunk, TransferError> {
        let offset = index * self.chunk_size as u64;
        self.file.seek(SeekFrom::Start(offset))?;

        let mut data = Vec::with_capacity(self.chunk_size);
        (&mut self.file)
            .take(self.chunk_size as u64)
            .read_to_end(&mut data)?;

        let last = if data.len() < self.chunk_size {
            true
        } else {
            self.at_eof()?
        };

        Ok(Chunk {
            index,
            offset,
            data,
            last,
        })
    }

    /// Reads the next chunk in sequence. Returns `None` once the last chunk
    /// has been handed out.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, TransferError> {
        if self.finished {
            return Ok(None);
        }
        let chunk = self.read_chunk(self.next_index)?;
        self.next_index += 1;
        self.finished = chunk.last;
        Ok(Some(chunk))
    }

    /// Configured window size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Index of the chunk `next_chunk` will return.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Returns true if nothing can be read at the current position.
    fn at_eof(&mut self) -> Result<bool, TransferError> {
        let mut probe = [0u8; 1];
        loop {
            match self.file.read(&mut probe) {
                Ok(n) => return Ok(n == 0),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
