//! Chunked upload pipeline.
//!
//! This crate implements the **upload logic** for one file. It has no
//! knowledge of where files come from or how results are shown: the agent
//! feeds it paths and hands the [`TerminalOutcome`] to a notifier.
//!
//! # Pipeline
//!
//! 1. **Settle**: wait until the file is no longer locked by a writer
//! 2. **Read**: take the next fixed-size window of the file
//! 3. **Send**: POST the window as a multipart chunk request
//! 4. **Decide**: stop on a rejected chunk or on the last chunk, else repeat
//!
//! There is no retry and no resume: the first failure ends the upload.

pub mod error;
pub mod transport;
pub mod types;
pub mod uploader;

// Re-export primary types for convenience.
pub use error::UploadError;
pub use monarch_protocol::TerminalOutcome;
pub use transport::{ChunkTransport, TransportError, TransportFuture};
pub use types::{UploadEvent, UploadSettings};
pub use uploader::ChunkUploader;
