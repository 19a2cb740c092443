use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A host identity or channel lookup failed.
    HostQuery,
    /// The host rejected a move command.
    HostCommand,
    AlreadyLocked,
    NotLocked,
    LockSetEmpty,
    InvalidRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct AdminError {
    pub code: ErrorCode,
    pub message: String,
    pub detail: Option<String>,
}
