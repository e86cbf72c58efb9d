//! Payload padding required by the disperser.
//!
//! The blob is interpreted as a sequence of 32 byte BN254 field elements, so every
//! symbol starts with a zero byte followed by at most 31 bytes of payload.

pub const BYTES_PER_SYMBOL: usize = 32;
const PAYLOAD_BYTES_PER_SYMBOL: usize = BYTES_PER_SYMBOL - 1;

/// Prefixes every 31 byte chunk of `data` with a zero byte. The last chunk is not filled
/// up, so the output is `data.len() + ceil(data.len() / 31)` bytes long.
#[must_use]
pub fn pad_payload(data: &[u8]) -> Vec<u8> {
    let symbols = data.len().div_ceil(PAYLOAD_BYTES_PER_SYMBOL);
    let mut padded = Vec::with_capacity(data.len() + symbols);
    for chunk in data.chunks(PAYLOAD_BYTES_PER_SYMBOL) {
        padded.push(0x00);
        padded.extend_from_slice(chunk);
    }
    padded
}

/// Inverse of [`pad_payload`]: drops the leading byte of every 32 byte symbol.
#[must_use]
pub fn unpad_payload(padded: &[u8]) -> Vec<u8> {
    let symbols = padded.len().div_ceil(BYTES_PER_SYMBOL);
    let mut data = Vec::with_capacity(padded.len().saturating_sub(symbols));
    for symbol in padded.chunks(BYTES_PER_SYMBOL) {
        data.extend_from_slice(&symbol[1..]);
    }
    data
}
