// std
use std::time::Duration;
// crates
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
// internal
use crate::{
    blob::{RequestId, RetrieveHandle},
    error::{Error, Result},
    proto::{BlobStatus, BlobStatusReply, BlobStatusRequest},
    transport::DisperserTransport,
};

pub const DEFAULT_STATUS_POLL_INTERVAL: Duration = Duration::from_secs(10);
const MIN_STATUS_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Classified answer of a single status query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusSnapshot {
    /// Not terminal yet, carries whatever status the disperser reported.
    Pending(BlobStatus),
    Confirmed(RetrieveHandle),
    Finalized(RetrieveHandle),
    Failed,
}

impl StatusSnapshot {
    /// Confirmed and finalized blobs both yield a handle, finalization is not awaited.
    pub fn from_reply(reply: BlobStatusReply) -> Result<Self> {
        match reply.status() {
            BlobStatus::Confirmed => retrieve_handle(reply).map(Self::Confirmed),
            BlobStatus::Finalized => retrieve_handle(reply).map(Self::Finalized),
            BlobStatus::Failed => Ok(Self::Failed),
            status => Ok(Self::Pending(status)),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending(_))
    }
}

fn retrieve_handle(reply: BlobStatusReply) -> Result<RetrieveHandle> {
    let status = reply.status();
    let proof = reply
        .info
        .and_then(|info| info.blob_verification_proof)
        .ok_or_else(|| {
            Error::ProtocolViolation(format!(
                "{} status without a blob verification proof",
                status.as_str_name()
            ))
        })?;
    let batch_metadata = proof.batch_metadata.ok_or_else(|| {
        Error::ProtocolViolation(format!(
            "{} status without batch metadata",
            status.as_str_name()
        ))
    })?;
    Ok(RetrieveHandle::new(
        batch_metadata.batch_header_hash,
        proof.blob_index,
    ))
}

/// Queries the status of a request once.
pub async fn query_status<T: DisperserTransport>(
    transport: &T,
    request_id: &RequestId,
) -> Result<StatusSnapshot> {
    let reply = transport
        .get_blob_status(BlobStatusRequest {
            request_id: request_id.as_bytes().to_vec(),
        })
        .await
        .map_err(Error::Transport)?;
    StatusSnapshot::from_reply(reply)
}

/// Polls the status endpoint on a fixed cadence until the blob is confirmed, finalized
/// or failed.
#[derive(Clone, Copy, Debug)]
pub struct StatusPoller {
    interval: Duration,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_POLL_INTERVAL)
    }
}

impl StatusPoller {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_STATUS_POLL_INTERVAL),
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The first query goes out one interval after the call. Query errors are returned
    /// as they are, the poller never retries them. Cancellation is honoured both while
    /// waiting for the next tick and while a query is in flight.
    pub async fn poll<T: DisperserTransport>(
        &self,
        transport: &T,
        request_id: &RequestId,
        cancel: &CancellationToken,
    ) -> Result<RetrieveHandle> {
        let timeout = || Error::DispersalTimeout {
            request_id: Some(request_id.clone()),
        };

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(timeout()),
                _ = ticker.tick() => {}
            }

            let snapshot = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(timeout()),
                snapshot = query_status(transport, request_id) => snapshot?,
            };

            match snapshot {
                StatusSnapshot::Confirmed(handle) | StatusSnapshot::Finalized(handle) => {
                    info!(
                        request_id = %request_id,
                        blob_index = handle.blob_index,
                        "blob dispersed"
                    );
                    return Ok(handle);
                }
                StatusSnapshot::Failed => {
                    error!(request_id = %request_id, "disperse blob failed");
                    return Err(Error::DispersalFailed {
                        request_id: request_id.clone(),
                    });
                }
                StatusSnapshot::Pending(status) => {
                    info!(
                        request_id = %request_id,
                        status = status.as_str_name(),
                        "waiting for blob to be confirmed or finalized"
                    );
                }
            }
        }
    }
}
