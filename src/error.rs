use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogicError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationFailed(String),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl LogicError {
    pub fn not_found(message: impl Into<String>) -> Self {
        LogicError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LogicError::ValidationFailed(message.into())
    }

    /// Stable error code used in IPC responses.
    pub fn code(&self) -> &'static str {
        match self {
            LogicError::NotFound(_) => "not_found",
            LogicError::ValidationFailed(_) => "validation_failed",
            LogicError::Storage(_) => "db_query_failed",
        }
    }
}

pub type LogicResult<T> = Result<T, LogicError>;
