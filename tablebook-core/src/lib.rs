pub mod booking;
pub mod calendar;
pub mod reconcile;
pub mod repository;
pub mod routes;
pub mod search;
pub mod session;
pub mod when;

/// Error taxonomy shared by every layer. The gateway normalizes all remote
/// failures into this before anything else sees them.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Transport failure with no response. The message is fixed so callers
    /// can rely on it; there is never a status code.
    #[error("Network Error")]
    Network,

    #[error("server error: {message}")]
    Server { status: u16, message: String },

    #[error("local store unreadable: {0}")]
    LocalState(String),
}

impl ClientError {
    /// Status code of the failing response, if one was received at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
