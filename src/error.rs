use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),
    #[error("archive entry {entry} changed since it was read (expected {expected}, found {found})")]
    HashMismatch {
        entry: String,
        expected: String,
        found: String,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("text encoding error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
