//! HTTP client for the MonarchUpload API.
//!
//! Every call is one `multipart/form-data` POST to `/v3/upload` whose JSON
//! reply is decoded into an [`UploadResponse`](monarch_protocol::UploadResponse).

pub mod client;
pub mod request;

pub use client::{ClientConfig, ClientError, UploadClient};
pub use request::ChunkRequest;
