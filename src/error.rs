//! Error types for the survey service
//!
//! Library code returns `Result<T>` and propagates with `?`; the HTTP layer
//! maps each variant to a status code.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid choice: {0} (expected Buy, Hold or Sell)")]
    InvalidChoice(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session is at stage {stage} of {total}; finalize needs a completed session")]
    NotTerminal { stage: usize, total: usize },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, SurveyError>;

impl SurveyError {
    /// True for failures caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SurveyError::InvalidChoice(_) | SurveyError::SessionNotFound(_) | SurveyError::NotTerminal { .. }
        )
    }
}
