//! Versioned packet envelope.
//!
//! Every payload is serialized with [`postcard`] and prefixed with the
//! protocol version negotiated for its packet kind:
//!
//! ```text
//! +----------------+---------------------------+
//! | version (u8)   |  postcard-encoded payload |
//! +----------------+---------------------------+
//! ```
//!
//! postcard writes unsigned integers as LEB128 varints and prefixes sequences
//! and strings with a varint length, which is exactly the count-prefixed,
//! variable-length layout the sync packets need.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::packet::{Packet, PacketKind, ProtocolVersion};

/// Errors that can occur while encoding or decoding a packet envelope.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// The payload was empty (no version byte).
    #[error("empty payload, no version byte")]
    EmptyPayload,

    /// Postcard (de)serialization failed.
    #[error("serialization error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Serialize `payload` into a versioned envelope for `kind`.
pub fn encode_packet<T: Serialize + ?Sized>(
    kind: PacketKind,
    version: ProtocolVersion,
    payload: &T,
) -> Result<Packet, PacketError> {
    let body = postcard::to_allocvec(payload)?;
    let mut out = Vec::with_capacity(1 + body.len());
    out.push(version.0);
    out.extend_from_slice(&body);
    Ok(Packet { kind, payload: out })
}

/// Split a versioned envelope into its version and decoded payload.
pub fn decode_packet<T: DeserializeOwned>(data: &[u8]) -> Result<(ProtocolVersion, T), PacketError> {
    let Some((&version, body)) = data.split_first() else {
        return Err(PacketError::EmptyPayload);
    };
    let payload = postcard::from_bytes(body)?;
    Ok((ProtocolVersion(version), payload))
}
