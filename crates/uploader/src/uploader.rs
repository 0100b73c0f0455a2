//! Chunk loop for a single file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use monarch_client::ChunkRequest;
use monarch_protocol::{CHUNK_SIZE, TerminalOutcome};
use monarch_transfer::{ChunkReader, StabilityGate, TransferError, UploadSession};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::transport::{ChunkTransport, TransportError};
use crate::types::{UploadEvent, UploadSettings};

/// Uploads files chunk by chunk through a [`ChunkTransport`].
pub struct ChunkUploader {
    transport: Arc<dyn ChunkTransport>,
    gate: StabilityGate,
    chunk_size: usize,
    events_tx: Option<mpsc::Sender<UploadEvent>>,
}

impl ChunkUploader {
    /// Creates an uploader using [`CHUNK_SIZE`] windows.
    pub fn new(transport: Arc<dyn ChunkTransport>) -> Self {
        Self {
            transport,
            gate: StabilityGate::new(),
            chunk_size: CHUNK_SIZE,
            events_tx: None,
        }
    }

    /// Overrides the window size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Overrides the stability gate.
    pub fn with_gate(mut self, gate: StabilityGate) -> Self {
        self.gate = gate;
        self
    }

    /// Sends progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Waits for `path` to become stable, then uploads it.
    pub async fn process(
        &self,
        path: &Path,
        settings: &UploadSettings,
    ) -> Result<TerminalOutcome, UploadError> {
        if let Err(e) = self.gate.wait_until_stable(path).await {
            let err = UploadError::io(path, e);
            self.report_failure(path, &err).await;
            return Err(err);
        }
        self.upload(path, settings).await
    }

    /// Uploads `path` until the service rejects a chunk or the last chunk is
    /// answered.
    ///
    /// The outcome reflects the terminal chunk's response. Transport and
    /// decoding failures abort the upload with no retry.
    pub async fn upload(
        &self,
        path: &Path,
        settings: &UploadSettings,
    ) -> Result<TerminalOutcome, UploadError> {
        match self.run(path, settings).await {
            Ok(outcome) => {
                info!(
                    path = %path.display(),
                    succeeded = outcome.succeeded,
                    chunks = outcome.chunks_sent,
                    bytes = outcome.bytes_sent,
                    message = %outcome.message,
                    "upload finished"
                );
                self.emit(UploadEvent::Completed {
                    path: path.to_path_buf(),
                    outcome: outcome.clone(),
                })
                .await;
                Ok(outcome)
            }
            Err(err) => {
                self.report_failure(path, &err).await;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        path: &Path,
        settings: &UploadSettings,
    ) -> Result<TerminalOutcome, UploadError> {
        let mut session = UploadSession::new(
            path,
            settings.secret.clone(),
            settings.private,
            self.chunk_size,
        )
        .map_err(|e| transfer_error(path, e))?;

        let mut reader = tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            let chunk_size = session.chunk_size();
            move || ChunkReader::new(&path, chunk_size)
        })
        .await
        .map_err(|e| UploadError::io(path, std::io::Error::other(e)))?
        .map_err(|e| transfer_error(path, e))?;

        debug!(path = %path.display(), session = session.id(), "upload started");
        self.emit(UploadEvent::Started {
            path: path.to_path_buf(),
        })
        .await;

        loop {
            let chunk_index = session.chunk_index();

            let (returned, read) = tokio::task::spawn_blocking(move || {
                let chunk = reader.read_chunk(chunk_index);
                (reader, chunk)
            })
            .await
            .map_err(|e| UploadError::io(path, std::io::Error::other(e)))?;
            reader = returned;
            let chunk = read.map_err(|e| transfer_error(path, e))?;

            let bytes = chunk.size();
            let last = chunk.last;
            let request = ChunkRequest::new(&session, chunk);

            let response = self
                .transport
                .send_chunk(request)
                .await
                .map_err(|e| match e {
                    TransportError::Network(source) => UploadError::Network {
                        chunk_index,
                        source,
                    },
                    TransportError::Protocol(reason) => UploadError::Protocol {
                        chunk_index,
                        reason,
                    },
                })?;

            session.record_chunk(bytes, last);
            debug!(
                session = session.id(),
                chunk_index,
                bytes,
                last,
                status = %response.status,
                "chunk answered"
            );
            self.emit(UploadEvent::ChunkSent {
                path: path.to_path_buf(),
                chunk_index,
                bytes,
                last,
            })
            .await;

            if !response.is_success() || last {
                return Ok(TerminalOutcome::from_response(
                    &response,
                    session.chunks_sent(),
                    session.bytes_sent(),
                ));
            }
        }
    }

    async fn report_failure(&self, path: &Path, err: &UploadError) {
        warn!(path = %path.display(), chunk = ?err.chunk_index(), error = %err, "upload failed");
        self.emit(UploadEvent::Failed {
            path: PathBuf::from(path),
            error: err.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events_tx {
            let _ = tx.send(event).await;
        }
    }
}

fn transfer_error(path: &Path, err: TransferError) -> UploadError {
    match err {
        TransferError::Io(e) => UploadError::io(path, e),
        TransferError::InvalidPath(p) => UploadError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("invalid path: {p}")),
        ),
    }
}
