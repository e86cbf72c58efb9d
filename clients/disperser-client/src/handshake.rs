// crates
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
// internal
use crate::{
    credential::{challenge_digest, AuthSigner},
    error::{Error, Result},
    proto::{
        authenticated_reply::Payload, AuthenticatedRequest, AuthenticationData, DisperseBlobReply,
        DisperseBlobRequest,
    },
    transport::{AuthenticatedStream, DisperserTransport},
};

/// Submits `data` over the authenticated stream and answers the disperser's challenges
/// until it acknowledges the blob.
///
/// The stream lives only inside this call and is dropped on every return path. Any
/// number of challenge rounds is answered; the first reply that is not a challenge ends
/// the exchange.
pub async fn authenticate<T, S>(
    transport: &T,
    signer: &S,
    data: Vec<u8>,
    custom_quorum_numbers: Vec<u32>,
    cancel: &CancellationToken,
) -> Result<DisperseBlobReply>
where
    T: DisperserTransport,
    S: AuthSigner + ?Sized,
{
    let request = DisperseBlobRequest {
        data,
        custom_quorum_numbers,
        account_id: signer.account_id(),
    };

    let mut stream = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Error::DispersalTimeout { request_id: None }),
        stream = transport.disperse_blob_authenticated() => stream.map_err(Error::Transport)?,
    };
    send(&mut stream, request.into(), cancel).await?;

    loop {
        let reply = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::DispersalTimeout { request_id: None }),
            reply = stream.recv() => reply.map_err(|e| {
                error!("disperse: error receiving authenticated reply: {e}");
                Error::Transport(e)
            })?,
        };
        let Some(reply) = reply else {
            return Err(Error::transport(
                "authenticated stream closed before the disperse reply",
            ));
        };

        match reply.payload {
            Some(Payload::BlobAuthHeader(header)) => {
                debug!(
                    challenge = header.challenge_parameter,
                    "disperse: received blob auth header"
                );
                let authentication_data =
                    signer.sign_digest(&challenge_digest(header.challenge_parameter))?;
                send(
                    &mut stream,
                    AuthenticationData {
                        authentication_data,
                    }
                    .into(),
                    cancel,
                )
                .await?;
            }
            Some(Payload::DisperseReply(reply)) => {
                if reply.request_id.is_empty() {
                    return Err(Error::ProtocolViolation(
                        "disperse reply without a request id".to_owned(),
                    ));
                }
                debug!(
                    request_id = %const_hex::encode(&reply.request_id),
                    status = reply.result().as_str_name(),
                    "disperse: received disperse reply"
                );
                return Ok(reply);
            }
            None => {
                return Err(Error::ProtocolViolation(
                    "authenticated reply is neither a challenge nor a disperse reply".to_owned(),
                ));
            }
        }
    }
}

async fn send<S: AuthenticatedStream>(
    stream: &mut S,
    request: AuthenticatedRequest,
    cancel: &CancellationToken,
) -> Result<()> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::DispersalTimeout { request_id: None }),
        sent = stream.send(request) => sent.map_err(Error::Transport),
    }
}
