// std
use std::fmt::{Debug, Formatter};
// crates
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use zeroize::Zeroizing;
// internal
use crate::error::{Error, Result};

pub const SECRET_KEY_LEN: usize = 32;
/// `r || s || v`, with `v` the raw recovery id (`0..=3`, no `+27` offset).
pub const SIGNATURE_LEN: usize = 65;

const ADDRESS_LEN: usize = 20;

/// Proves ownership of the account a blob is dispersed for.
///
/// [`Credential`] is the in-memory implementation; keys held elsewhere (an HSM, a remote
/// signer) only need to produce the same account id and recoverable signatures.
pub trait AuthSigner: Send + Sync {
    /// Account id sent along with the blob, it must belong to the key used by
    /// [`AuthSigner::sign_digest`].
    fn account_id(&self) -> String;

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>>;
}

/// Public identity of a credential. Safe to log or display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// `0x` prefixed hex of the uncompressed public key, including the `0x04` tag byte.
    pub public_key: String,
    /// EIP-55 checksummed address.
    pub address: String,
}

/// A secp256k1 private key parsed from its hex form.
pub struct Credential {
    secret: Zeroizing<[u8; SECRET_KEY_LEN]>,
    public_key: PublicKey,
}

impl Credential {
    /// Parses a 32 byte private key written as hex, with or without a `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let hex = private_key.strip_prefix("0x").unwrap_or(private_key);
        let bytes = Zeroizing::new(
            const_hex::decode(hex).map_err(|e| Error::InvalidCredential(e.to_string()))?,
        );
        if bytes.len() != SECRET_KEY_LEN {
            return Err(Error::InvalidCredential(format!(
                "expected {SECRET_KEY_LEN} bytes of key material, got {}",
                bytes.len()
            )));
        }
        let mut secret = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        secret.copy_from_slice(&bytes);
        Self::from_bytes(secret)
    }

    pub fn from_bytes(secret: Zeroizing<[u8; SECRET_KEY_LEN]>) -> Result<Self> {
        let secret_key = secret_key(&secret)?;
        let public_key = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret_key);
        Ok(Self { secret, public_key })
    }

    #[must_use]
    pub fn account(&self) -> Account {
        let public_key = self.public_key.serialize_uncompressed();
        Account {
            public_key: const_hex::encode_prefixed(public_key),
            address: checksum_address(&address_bytes(&public_key)),
        }
    }

    pub fn sign_challenge(&self, challenge_parameter: u32) -> Result<Vec<u8>> {
        self.sign_digest(&challenge_digest(challenge_parameter))
    }
}

impl AuthSigner for Credential {
    fn account_id(&self) -> String {
        const_hex::encode_prefixed(self.public_key.serialize_uncompressed())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>> {
        let message =
            Message::from_slice(digest).map_err(|e| Error::InvalidCredential(e.to_string()))?;
        let secret_key = secret_key(&self.secret)?;
        let (recovery_id, compact) = Secp256k1::signing_only()
            .sign_ecdsa_recoverable(&message, &secret_key)
            .serialize_compact();

        let mut signature = Vec::with_capacity(SIGNATURE_LEN);
        signature.extend_from_slice(&compact);
        // Recovery ids are always 0..=3.
        signature.push(recovery_id.to_i32() as u8);
        Ok(signature)
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.account().address)
            .finish_non_exhaustive()
    }
}

/// Digest signed in answer to a disperser challenge: keccak256 of the big endian bytes.
#[must_use]
pub fn challenge_digest(challenge_parameter: u32) -> [u8; 32] {
    Keccak256::digest(challenge_parameter.to_be_bytes()).into()
}

fn secret_key(secret: &[u8; SECRET_KEY_LEN]) -> Result<SecretKey> {
    SecretKey::from_slice(secret).map_err(|e| Error::InvalidCredential(e.to_string()))
}

fn address_bytes(uncompressed_public_key: &[u8; 65]) -> [u8; ADDRESS_LEN] {
    let hash = Keccak256::digest(&uncompressed_public_key[1..]);
    let mut address = [0u8; ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ADDRESS_LEN..]);
    address
}

/// EIP-55 mixed-case encoding.
fn checksum_address(address: &[u8; ADDRESS_LEN]) -> String {
    let lowercase = const_hex::encode(address);
    let hash = Keccak256::digest(lowercase.as_bytes());

    let mut checksummed = String::with_capacity(2 + lowercase.len());
    checksummed.push_str("0x");
    for (i, c) in lowercase.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }
    checksummed
}
