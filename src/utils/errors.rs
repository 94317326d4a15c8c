use thiserror::Error;

use crate::snapshot::{PolicyError, SnapshotError};
use crate::wait::WaitError;

/// Errors returned by tool execution
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error("Snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ToolError::InvalidArguments(message.into())
    }
}

/// Implement From<PolicyError> for ToolError
impl From<PolicyError> for ToolError {
    fn from(err: PolicyError) -> Self {
        ToolError::InvalidArguments(err.to_string())
    }
}
