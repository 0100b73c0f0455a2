pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use constants::{CHUNK_SIZE, DEFAULT_BASE_URL, UPLOAD_PATH, fields, form_flag};
pub use types::{ResponseData, TerminalOutcome, UploadResponse};
