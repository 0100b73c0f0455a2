use serde::{Deserialize, Serialize};

use crate::constants::STATUS_SUCCESS;

/// Payload of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(default)]
    pub url: String,
}

/// JSON body returned by `POST /v3/upload` for every chunk.
///
/// `data` is usually absent when the request was rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

impl UploadResponse {
    /// Returns true if the service accepted the request.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Returns the resulting URL, if the service sent a non-empty one.
    pub fn url(&self) -> Option<&str> {
        self.data
            .as_ref()
            .map(|d| d.url.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// Final result of one file's upload sequence.
///
/// Derived from the response to the last chunk that was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalOutcome {
    pub succeeded: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub chunks_sent: u64,
    pub bytes_sent: u64,
}

impl TerminalOutcome {
    /// Builds the outcome from the terminal chunk's response.
    pub fn from_response(resp: &UploadResponse, chunks_sent: u64, bytes_sent: u64) -> Self {
        Self {
            succeeded: resp.is_success(),
            message: resp.message.clone(),
            url: resp.url().map(str::to_owned),
            chunks_sent,
            bytes_sent,
        }
    }
}
