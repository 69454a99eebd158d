//! Backend client errors

use thiserror::Error;

/// Failure modes of a backend API call, kept distinct so the web layer can
/// present the right thing: transport failures get a generic message, status
/// failures surface the backend's own wording, and payload mismatches point
/// at a contract drift.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Network(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected backend payload: {0}")]
    UnexpectedPayload(String),
}

impl BackendError {
    /// True when the backend rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::Status { status: 404, .. })
    }
}
