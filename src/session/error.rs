use thiserror::Error;

/// Errors reading or writing the persisted session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
