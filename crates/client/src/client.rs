//! MonarchUpload API client.
//!
//! Async HTTP client using `reqwest` multipart bodies.

use std::time::Duration;

use monarch_protocol::{DEFAULT_BASE_URL, UPLOAD_PATH, UploadResponse};

use crate::request::ChunkRequest;

/// Errors from the upload client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response (HTTP {status}): {reason}")]
    Protocol { status: u16, reason: String },
}

/// Connection settings for [`UploadClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, without the `/v3/upload` path.
    pub base_url: String,
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

/// MonarchUpload API client.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: String,
}

impl UploadClient {
    /// Creates a new client.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("monarch/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), UPLOAD_PATH),
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one chunk and decodes the service's reply.
    pub async fn send(&self, request: ChunkRequest) -> Result<UploadResponse, ClientError> {
        let chunk_index = request.chunk_index();
        let bytes = request.data().len();
        let last = request.is_last_chunk();
        let form = request.into_form()?;

        tracing::trace!(chunk_index, bytes, last, "posting chunk");
        self.post(form).await
    }

    /// Performs the POST and decodes the JSON body.
    ///
    /// A non-2xx status is still decoded: the service reports rejections as
    /// regular `UploadResponse` bodies.
    async fn post(
        &self,
        form: reqwest::multipart::Form,
    ) -> Result<UploadResponse, ClientError> {
        let resp = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        match decode_response(&body) {
            Ok(parsed) => {
                if !status.is_success() {
                    tracing::warn!(
                        status = status.as_u16(),
                        message = %parsed.message,
                        "upload service returned error status"
                    );
                }
                Ok(parsed)
            }
            Err(e) => Err(ClientError::Protocol {
                status: status.as_u16(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Decodes a response body.
fn decode_response(body: &[u8]) -> Result<UploadResponse, serde_json::Error> {
    serde_json::from_slice(body)
}
