// std
use std::future::Future;
// crates
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
// internal
use crate::{
    blob::{RequestId, RetrieveHandle},
    codec,
    credential::{AuthSigner, Credential},
    error::Result,
    handshake,
    settings::DispersalSettings,
    status::{self, StatusPoller, StatusSnapshot},
    transport::DisperserTransport,
};

/// Disperses blobs through a [`DisperserTransport`] and waits for them to be confirmed.
///
/// Calls share nothing but the transport, so one client can serve concurrent
/// dispersals.
pub struct DisperserClient<T> {
    transport: T,
    settings: DispersalSettings,
}

impl<T: DisperserTransport> DisperserClient<T> {
    pub const fn new(transport: T, settings: DispersalSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub const fn settings(&self) -> &DispersalSettings {
        &self.settings
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Pads and disperses `data` signed by the hex encoded secp256k1 `private_key`.
    ///
    /// The key is parsed before the disperser is contacted. Returns once the blob is
    /// confirmed or finalized, the disperser reports a failure, or `cancel` (or the
    /// configured timeout) fires.
    pub async fn disperse(
        &self,
        data: &[u8],
        private_key: &str,
        cancel: &CancellationToken,
    ) -> Result<RetrieveHandle> {
        let credential = Credential::from_hex(private_key)?;
        debug!(bytes = data.len(), "dispersing blob");
        self.disperse_with_signer(data, &credential, cancel).await
    }

    pub async fn disperse_with_signer<S>(
        &self,
        data: &[u8],
        signer: &S,
        cancel: &CancellationToken,
    ) -> Result<RetrieveHandle>
    where
        S: AuthSigner + ?Sized,
    {
        let cancel = cancel.child_token();
        let dispersal = async {
            let reply = handshake::authenticate(
                &self.transport,
                signer,
                codec::pad_payload(data),
                self.settings.custom_quorum_numbers.clone(),
                &cancel,
            )
            .await?;
            let request_id = RequestId::from(reply.request_id);
            info!(request_id = %request_id, "blob accepted by the disperser");
            let poller = self.poller();
            poller.poll(&self.transport, &request_id, &cancel).await
        };
        self.with_deadline(dispersal, &cancel).await
    }

    /// Queries the status of an earlier dispersal once, e.g. after a timeout.
    pub async fn blob_status(&self, request_id: &RequestId) -> Result<StatusSnapshot> {
        status::query_status(&self.transport, request_id).await
    }

    /// Resumes polling for a request id obtained from an earlier dispersal.
    pub async fn wait_for_confirmation(
        &self,
        request_id: &RequestId,
        cancel: &CancellationToken,
    ) -> Result<RetrieveHandle> {
        let cancel = cancel.child_token();
        let poller = self.poller();
        let polling = poller.poll(&self.transport, request_id, &cancel);
        self.with_deadline(polling, &cancel).await
    }

    fn poller(&self) -> StatusPoller {
        StatusPoller::new(self.settings.status_poll_interval)
    }

    /// Cancels `cancel` once the configured timeout elapses and lets `fut` observe it, so
    /// the error it returns still carries the request id when there is one.
    async fn with_deadline<F>(&self, fut: F, cancel: &CancellationToken) -> Result<RetrieveHandle>
    where
        F: Future<Output = Result<RetrieveHandle>>,
    {
        let Some(timeout) = self.settings.timeout else {
            return fut.await;
        };
        tokio::pin!(fut);
        tokio::select! {
            biased;
            result = &mut fut => result,
            () = tokio::time::sleep(timeout) => {
                debug!(?timeout, "dispersal deadline reached");
                cancel.cancel();
                fut.await
            }
        }
    }
}
