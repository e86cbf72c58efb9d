//! Scripted in-memory disperser used by tests.
//!
//! Replies are served in the order they were pushed, independently of what the client
//! sends, and every request is recorded so tests can assert on the exchange.

// std
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};
// internal
use crate::{
    error::DynError,
    proto::{
        AuthenticatedReply, AuthenticatedRequest, BatchMetadata, BlobAuthHeader, BlobInfo,
        BlobStatus, BlobStatusReply, BlobStatusRequest, BlobVerificationProof, DisperseBlobReply,
    },
    transport::{AuthenticatedStream, DisperserTransport},
};

/// One reply on the authenticated stream.
#[derive(Clone, Debug)]
pub enum AuthStep {
    Challenge(u32),
    Reply(DisperseBlobReply),
    /// A reply carrying neither of the known payloads.
    Empty,
    Error(String),
    /// Never answers.
    Stall,
}

/// One answer of the status endpoint.
#[derive(Clone, Debug)]
pub enum StatusStep {
    Reply(BlobStatusReply),
    Error(String),
    Stall,
}

#[derive(Default)]
struct MockState {
    auth_script: VecDeque<AuthStep>,
    status_script: VecDeque<StatusStep>,
    sent: Vec<AuthenticatedRequest>,
    status_queries: Vec<BlobStatusRequest>,
    recv_calls: usize,
    streams_opened: usize,
    open_streams: usize,
    fail_open: bool,
    accepted_sends: Option<usize>,
}

#[derive(Clone, Default)]
pub struct MockDisperser {
    state: Arc<Mutex<MockState>>,
}

impl MockDisperser {
    pub fn push_auth(&self, steps: impl IntoIterator<Item = AuthStep>) {
        self.lock().auth_script.extend(steps);
    }

    pub fn push_status(&self, steps: impl IntoIterator<Item = StatusStep>) {
        self.lock().status_script.extend(steps);
    }

    /// Makes every following attempt to open the authenticated stream fail.
    pub fn fail_open(&self) {
        self.lock().fail_open = true;
    }

    /// Accepts the first `accepted` sends on the authenticated stream and fails every
    /// later one. Failed sends are not recorded.
    pub fn fail_sends_after(&self, accepted: usize) {
        self.lock().accepted_sends = Some(accepted);
    }

    #[must_use]
    pub fn sent_requests(&self) -> Vec<AuthenticatedRequest> {
        self.lock().sent.clone()
    }

    #[must_use]
    pub fn status_queries(&self) -> Vec<BlobStatusRequest> {
        self.lock().status_queries.clone()
    }

    #[must_use]
    pub fn recv_calls(&self) -> usize {
        self.lock().recv_calls
    }

    #[must_use]
    pub fn streams_opened(&self) -> usize {
        self.lock().streams_opened
    }

    /// Streams handed out and not dropped yet.
    #[must_use]
    pub fn open_streams(&self) -> usize {
        self.lock().open_streams
    }

    #[must_use]
    pub fn disperse_reply(request_id: &[u8]) -> DisperseBlobReply {
        DisperseBlobReply {
            result: BlobStatus::Processing.into(),
            request_id: request_id.to_vec(),
        }
    }

    #[must_use]
    pub fn status_reply(status: BlobStatus) -> StatusStep {
        StatusStep::Reply(BlobStatusReply {
            status: status.into(),
            info: None,
        })
    }

    /// A status reply carrying a verification proof.
    #[must_use]
    pub fn confirmed_reply(
        status: BlobStatus,
        batch_header_hash: Vec<u8>,
        blob_index: u32,
    ) -> StatusStep {
        StatusStep::Reply(BlobStatusReply {
            status: status.into(),
            info: Some(BlobInfo {
                blob_header: None,
                blob_verification_proof: Some(BlobVerificationProof {
                    blob_index,
                    batch_metadata: Some(BatchMetadata {
                        batch_header_hash,
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock disperser state poisoned")
    }
}

pub struct MockStream {
    state: Arc<Mutex<MockState>>,
}

impl MockStream {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock disperser state poisoned")
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.open_streams -= 1;
        }
    }
}

#[async_trait::async_trait]
impl AuthenticatedStream for MockStream {
    async fn send(&mut self, request: AuthenticatedRequest) -> Result<(), DynError> {
        let mut state = self.lock();
        if state
            .accepted_sends
            .is_some_and(|accepted| state.sent.len() >= accepted)
        {
            return Err("mock disperser dropped the request".into());
        }
        state.sent.push(request);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<AuthenticatedReply>, DynError> {
        let step = {
            let mut state = self.lock();
            state.recv_calls += 1;
            state.auth_script.pop_front()
        };
        match step {
            None => Ok(None),
            Some(AuthStep::Challenge(challenge_parameter)) => {
                Ok(Some(BlobAuthHeader { challenge_parameter }.into()))
            }
            Some(AuthStep::Reply(reply)) => Ok(Some(reply.into())),
            Some(AuthStep::Empty) => Ok(Some(AuthenticatedReply { payload: None })),
            Some(AuthStep::Error(error)) => Err(error.into()),
            Some(AuthStep::Stall) => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl DisperserTransport for MockDisperser {
    type Stream = MockStream;

    async fn disperse_blob_authenticated(&self) -> Result<Self::Stream, DynError> {
        let mut state = self.lock();
        if state.fail_open {
            return Err("mock disperser refused the stream".into());
        }
        state.streams_opened += 1;
        state.open_streams += 1;
        Ok(MockStream {
            state: Arc::clone(&self.state),
        })
    }

    async fn get_blob_status(
        &self,
        request: BlobStatusRequest,
    ) -> Result<BlobStatusReply, DynError> {
        let step = {
            let mut state = self.lock();
            state.status_queries.push(request);
            state.status_script.pop_front()
        };
        match step {
            None => Err("mock disperser has no more status replies".into()),
            Some(StatusStep::Reply(reply)) => Ok(reply),
            Some(StatusStep::Error(error)) => Err(error.into()),
            Some(StatusStep::Stall) => std::future::pending().await,
        }
    }
}
