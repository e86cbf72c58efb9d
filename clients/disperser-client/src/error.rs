// internal
use crate::blob::RequestId;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a dispersal can end without a [`crate::RetrieveHandle`].
///
/// None of these are retried by the client. Retrying is left to the caller so that a
/// payload is never submitted twice behind its back.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
    #[error("Transport error: {0}")]
    Transport(#[source] DynError),
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
    #[error("Disperser reported a failed dispersal for request {request_id}")]
    DispersalFailed { request_id: RequestId },
    /// The cancellation token fired first. When the handshake already completed the
    /// request id is kept so the caller can query the status again later.
    #[error("Dispersal timed out")]
    DispersalTimeout { request_id: Option<RequestId> },
}

impl Error {
    pub(crate) fn transport<E: Into<DynError>>(error: E) -> Self {
        Self::Transport(error.into())
    }
}
