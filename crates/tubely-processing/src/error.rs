use thiserror::Error;
use tubely_core::AppError;

/// Failures from the external media tools.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} did not finish within {seconds}s")]
    Timeout { tool: String, seconds: u64 },

    #[error("probe failed: {0}")]
    Probe(String),

    #[error("remux failed: {0}")]
    Remux(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        AppError::Processing(err.to_string())
    }
}
