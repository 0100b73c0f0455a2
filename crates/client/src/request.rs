//! Multipart request bodies.

use monarch_protocol::{fields, form_flag};
use monarch_transfer::{Chunk, UploadSession};
use reqwest::multipart::{Form, Part};

/// MIME type of the `file` part.
const FILE_MIME: &str = "application/octet-stream";

/// One chunk upload request. Built once, consumed by the send.
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    secret: String,
    private: bool,
    file_name: String,
    data: Vec<u8>,
    last_chunk: bool,
    chunk_index: u64,
}

impl ChunkRequest {
    /// Builds the request for `chunk` of the file tracked by `session`.
    pub fn new(session: &UploadSession, chunk: Chunk) -> Self {
        Self {
            secret: session.secret().to_owned(),
            private: session.private(),
            file_name: session.file_name().to_owned(),
            last_chunk: chunk.last,
            chunk_index: chunk.index,
            data: chunk.data,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn private(&self) -> bool {
        self.private
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_last_chunk(&self) -> bool {
        self.last_chunk
    }

    pub fn chunk_index(&self) -> u64 {
        self.chunk_index
    }

    /// Converts the request into its multipart form.
    ///
    /// Fields are written as `secret`, `chunked`, `private`, `file`,
    /// `lastchunk`.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let file = Part::bytes(self.data)
            .file_name(self.file_name)
            .mime_str(FILE_MIME)?;

        Ok(Form::new()
            .text(fields::SECRET, self.secret)
            .text(fields::CHUNKED, form_flag(true))
            .text(fields::PRIVATE, form_flag(self.private))
            .part(fields::FILE, file)
            .text(fields::LAST_CHUNK, form_flag(self.last_chunk)))
    }
}
