//! Chunk transport trait.
//!
//! `ChunkTransport` decouples the chunk loop from HTTP so the loop is
//! testable with mocks. [`UploadClient`] is the production implementation.

use std::future::Future;
use std::pin::Pin;

use monarch_client::{ChunkRequest, ClientError, UploadClient};
use monarch_protocol::UploadResponse;

/// Boxed future returned by [`ChunkTransport::send_chunk`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<UploadResponse, TransportError>> + Send + 'a>>;

/// Failure of a single chunk exchange.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("{0}")]
    Network(Box<dyn std::error::Error + Send + Sync>),

    /// A response arrived but could not be decoded.
    #[error("{0}")]
    Protocol(String),
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Network(e) => TransportError::Network(Box::new(e)),
            ClientError::Protocol { .. } => TransportError::Protocol(err.to_string()),
        }
    }
}

/// Sends one chunk request and returns the decoded service reply.
pub trait ChunkTransport: Send + Sync {
    fn send_chunk(&self, request: ChunkRequest) -> TransportFuture<'_>;
}

impl ChunkTransport for UploadClient {
    fn send_chunk(&self, request: ChunkRequest) -> TransportFuture<'_> {
        Box::pin(async move { self.send(request).await.map_err(TransportError::from) })
    }
}
