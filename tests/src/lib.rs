// std
use std::sync::{Arc, Mutex};
// crates
use disperser_client::{
    mock::{AuthStep, MockDisperser, StatusStep},
    proto::{authenticated_request::Payload, AuthenticatedRequest, BlobStatus},
    DispersalSettings, DisperserClient,
};
use disperser_tracing::SharedWriter;
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, Secp256k1,
};
// internal

pub const PRIVATE_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

/// A disperser that accepts the blob after answering `challenges`, reports the blob
/// as processing `pending` times and then replies with `terminal`.
pub fn scripted_disperser(
    challenges: &[u32],
    request_id: &[u8],
    pending: usize,
    terminal: StatusStep,
) -> MockDisperser {
    let mock = MockDisperser::default();
    mock.push_auth(challenges.iter().copied().map(AuthStep::Challenge));
    mock.push_auth([AuthStep::Reply(MockDisperser::disperse_reply(request_id))]);
    mock.push_status(
        std::iter::repeat_with(|| MockDisperser::status_reply(BlobStatus::Processing))
            .take(pending),
    );
    mock.push_status([terminal]);
    mock
}

pub fn client(mock: &MockDisperser, settings: DispersalSettings) -> DisperserClient<MockDisperser> {
    DisperserClient::new(mock.clone(), settings)
}

/// Signatures sent by the client, in order.
pub fn sent_signatures(requests: &[AuthenticatedRequest]) -> Vec<Vec<u8>> {
    requests
        .iter()
        .filter_map(|request| match &request.payload {
            Some(Payload::AuthenticationData(data)) => Some(data.authentication_data.clone()),
            _ => None,
        })
        .collect()
}

/// Recovers the uncompressed public key, `0x` prefixed, that produced `signature` over
/// `digest`.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> String {
    assert_eq!(signature.len(), 65);
    let recovery_id = RecoveryId::from_i32(i32::from(signature[64])).unwrap();
    let signature = RecoverableSignature::from_compact(&signature[..64], recovery_id).unwrap();
    let public_key: PublicKey = Secp256k1::verification_only()
        .recover_ecdsa(&Message::from_slice(digest).unwrap(), &signature)
        .unwrap();
    const_hex::encode_prefixed(public_key.serialize_uncompressed())
}

/// In-memory log sink that can be handed to the tracing setup and read back.
#[derive(Clone, Default)]
pub struct LogBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn writer(&self) -> SharedWriter {
        let buffer: Arc<Mutex<dyn std::io::Write + Send + Sync>> = self.buffer.clone();
        SharedWriter::from_inner(buffer)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}
