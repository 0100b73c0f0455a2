/// Production upload service.
pub const DEFAULT_BASE_URL: &str = "https://api.monarchupload.cc";

/// Endpoint for both single and chunked uploads.
pub const UPLOAD_PATH: &str = "/v3/upload";

/// Size of one upload window in bytes (5 MB, decimal).
pub const CHUNK_SIZE: usize = 5_000_000;

/// Status value the service returns for an accepted request.
pub const STATUS_SUCCESS: &str = "success";

/// Multipart form field names, in the order they are written.
pub mod fields {
    pub const SECRET: &str = "secret";
    pub const CHUNKED: &str = "chunked";
    pub const PRIVATE: &str = "private";
    pub const FILE: &str = "file";
    pub const LAST_CHUNK: &str = "lastchunk";
}

/// Renders a boolean the way the service expects form flags.
pub fn form_flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
