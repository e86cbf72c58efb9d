// internal
use crate::{
    error::DynError,
    proto::{AuthenticatedReply, AuthenticatedRequest, BlobStatusReply, BlobStatusRequest},
};

/// Client half of the `DisperseBlobAuthenticated` bidirectional stream.
///
/// Dropping the stream releases it, there is no separate close step.
#[async_trait::async_trait]
pub trait AuthenticatedStream: Send {
    async fn send(&mut self, request: AuthenticatedRequest) -> Result<(), DynError>;

    /// Waits for the next reply. `Ok(None)` means the disperser closed the stream.
    async fn recv(&mut self) -> Result<Option<AuthenticatedReply>, DynError>;
}

/// The two disperser RPCs the client relies on.
#[async_trait::async_trait]
pub trait DisperserTransport: Send + Sync {
    type Stream: AuthenticatedStream;

    async fn disperse_blob_authenticated(&self) -> Result<Self::Stream, DynError>;

    async fn get_blob_status(
        &self,
        request: BlobStatusRequest,
    ) -> Result<BlobStatusReply, DynError>;
}
