use thiserror::Error;

use crate::api::http::CallError;

/// Every way a single sync step can fail.
///
/// Whether a failure is fatal is decided by the orchestrator, not here: the
/// same `Timeout` is fatal for the likes fetch and advisory for the playlist
/// read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("missing credentials: {}", .missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("unexpected response structure: {0}")]
    UnexpectedStructure(String),

    #[error("{invalid} of {total} track references failed validation")]
    InvalidData { invalid: usize, total: usize },

    #[error("request cancelled")]
    Cancelled,
}

impl From<CallError> for SyncError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Timeout(d) => SyncError::Timeout(d.as_millis() as u64),
            CallError::Network(msg) => SyncError::Network(msg),
            CallError::Api { status, message } => SyncError::Api {
                status,
                detail: message,
            },
            CallError::Cancelled => SyncError::Cancelled,
        }
    }
}

/// Human-readable classification of a failed playlist write.
pub fn describe_write_failure(err: &SyncError) -> String {
    match err {
        SyncError::Api { status: 404, .. } => "playlist not found".into(),
        SyncError::Api { status: 403, .. } => "permission denied".into(),
        SyncError::Api { status: 401, .. } => "authentication failed".into(),
        SyncError::Api { status, detail } => {
            format!("playlist update failed with status {}: {}", status, detail)
        }
        other => other.to_string(),
    }
}
