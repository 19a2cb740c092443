use admintools_core::{AdminError, ErrorCode};
use admintools_host::HostError;

/// Lookup failures abort the current operation only.
pub(crate) fn query_error(action: &str, err: HostError) -> AdminError {
    AdminError {
        code: ErrorCode::HostQuery,
        message: action.to_string(),
        detail: Some(err.to_string()),
    }
}

/// Rejected move requests are reported, never retried.
pub(crate) fn command_error(action: &str, err: HostError) -> AdminError {
    AdminError {
        code: ErrorCode::HostCommand,
        message: action.to_string(),
        detail: Some(err.to_string()),
    }
}
