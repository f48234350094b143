//! Chunk record format.
//!
//! A chunk file is a plain sequence of records with no header, so that a
//! chunk can be renamed, concatenated or inspected without rewriting it.
//!
//! # Record Layout
//!
//! ```text
//! ┌──────────────────┬─────────────────────────┬──────────┐
//! │ Length (4 bytes) │ Payload (Length bytes)  │ CRC32 (4)│
//! └──────────────────┴─────────────────────────┴──────────┘
//! ```
//!
//! Length is little-endian and counts the payload only. The payload is the
//! MessagePack encoding of an [`Element`]. The CRC covers the payload.

use crc32fast::Hasher;
use snapstream_core::Element;

/// Size of the length prefix in bytes
pub const RECORD_LENGTH_SIZE: usize = 4;

/// Size of the CRC suffix in bytes
pub const RECORD_CRC_SIZE: usize = 4;

/// Framing overhead per record
pub const RECORD_OVERHEAD: usize = RECORD_LENGTH_SIZE + RECORD_CRC_SIZE;

/// Largest payload a record can carry
pub const MAX_RECORD_PAYLOAD: usize = u32::MAX as usize;

/// Errors from encoding or decoding a single record
#[derive(Debug, thiserror::Error)]
pub enum ChunkRecordError {
    /// Element could not be serialized
    #[error("Encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Payload could not be deserialized into an element
    #[error("Decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// Encoded element does not fit in a record
    #[error("Record payload too large: {0} bytes")]
    TooLarge(usize),

    /// Stored CRC does not match the payload
    #[error("Checksum mismatch: expected {expected:08x}, computed {computed:08x}")]
    ChecksumMismatch {
        /// CRC stored in the record
        expected: u32,
        /// CRC computed over the payload
        computed: u32,
    },

    /// Fewer bytes than the record header announces
    #[error("Truncated record: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes the record requires
        needed: usize,
        /// Bytes available
        available: usize,
    },
}

/// Encode an element as one framed record
pub fn encode_record(element: &Element) -> Result<Vec<u8>, ChunkRecordError> {
    let payload = rmp_serde::to_vec(element)?;
    if payload.len() > MAX_RECORD_PAYLOAD {
        return Err(ChunkRecordError::TooLarge(payload.len()));
    }

    let mut bytes = Vec::with_capacity(payload.len() + RECORD_OVERHEAD);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&payload);
    bytes.extend_from_slice(&payload_crc(&payload).to_le_bytes());
    Ok(bytes)
}

/// Decode one record from the front of `bytes`.
///
/// Returns the element and the number of bytes consumed.
pub fn decode_record(bytes: &[u8]) -> Result<(Element, usize), ChunkRecordError> {
    if bytes.len() < RECORD_LENGTH_SIZE {
        return Err(ChunkRecordError::Truncated {
            needed: RECORD_LENGTH_SIZE,
            available: bytes.len(),
        });
    }

    let mut len_bytes = [0u8; RECORD_LENGTH_SIZE];
    len_bytes.copy_from_slice(&bytes[..RECORD_LENGTH_SIZE]);
    let payload_len = u32::from_le_bytes(len_bytes) as usize;

    let total = match payload_len.checked_add(RECORD_OVERHEAD) {
        Some(total) if total <= bytes.len() => total,
        needed => {
            return Err(ChunkRecordError::Truncated {
                needed: needed.unwrap_or(usize::MAX),
                available: bytes.len(),
            })
        }
    };

    let payload = &bytes[RECORD_LENGTH_SIZE..RECORD_LENGTH_SIZE + payload_len];
    let mut crc_bytes = [0u8; RECORD_CRC_SIZE];
    crc_bytes.copy_from_slice(&bytes[RECORD_LENGTH_SIZE + payload_len..total]);
    let expected = u32::from_le_bytes(crc_bytes);
    let computed = payload_crc(payload);
    if expected != computed {
        return Err(ChunkRecordError::ChecksumMismatch { expected, computed });
    }

    let element: Element = rmp_serde::from_slice(payload)?;
    Ok((element, total))
}

fn payload_crc(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}
