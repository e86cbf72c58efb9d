// std
use std::fmt::{Debug, Display, Formatter};
// crates
use serde::{Deserialize, Serialize};
// internal
use crate::proto::RetrieveBlobRequest;

/// Opaque identifier the disperser assigns to an accepted blob.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Vec<u8>);

impl RequestId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for RequestId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RequestId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&const_hex::encode(&self.0))
    }
}

impl Debug for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestId({self})")
    }
}

/// Everything needed to fetch a confirmed blob back from the disperser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveHandle {
    pub batch_header_hash: Vec<u8>,
    pub blob_index: u32,
}

impl RetrieveHandle {
    #[must_use]
    pub const fn new(batch_header_hash: Vec<u8>, blob_index: u32) -> Self {
        Self {
            batch_header_hash,
            blob_index,
        }
    }
}

impl From<RetrieveHandle> for RetrieveBlobRequest {
    fn from(handle: RetrieveHandle) -> Self {
        Self {
            batch_header_hash: handle.batch_header_hash,
            blob_index: handle.blob_index,
        }
    }
}
