//! Per-packet-kind capability negotiation.
//!
//! During the connection handshake the client advertises, per packet kind,
//! the highest version it understands. The server knows which versions it can
//! emit. [`ServerCapabilities::negotiate`] picks the highest version both
//! sides support, or `None` when the client never advertised the kind.
//! `None` means the feature is suppressed entirely; callers never fall back
//! to a degraded payload.

use rustc_hash::FxHashMap;

use crate::packet::{PacketKind, ProtocolVersion};

/// What a single client advertised during its handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientCapabilities {
    max_versions: FxHashMap<PacketKind, ProtocolVersion>,
}

impl ClientCapabilities {
    /// A client that supports nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// A client that understands every kind up to `version`.
    pub fn all(version: ProtocolVersion) -> Self {
        let mut caps = Self::default();
        for kind in PacketKind::ALL {
            caps.advertise(kind, version);
        }
        caps
    }

    /// Builds capabilities from raw handshake `(channel, max_version)` pairs.
    ///
    /// Unknown channels are ignored.
    pub fn from_handshake<'a>(entries: impl IntoIterator<Item = (&'a str, u8)>) -> Self {
        let mut caps = Self::default();
        for (channel, version) in entries {
            match PacketKind::from_channel(channel) {
                Some(kind) => caps.advertise(kind, ProtocolVersion(version)),
                None => tracing::debug!("ignoring unknown handshake channel {channel}"),
            }
        }
        caps
    }

    /// Records that the client understands `kind` up to `max_version`.
    pub fn advertise(&mut self, kind: PacketKind, max_version: ProtocolVersion) {
        self.max_versions.insert(kind, max_version);
    }

    /// Removes a kind from the advertised set.
    pub fn revoke(&mut self, kind: PacketKind) {
        self.max_versions.remove(&kind);
    }

    /// Highest version the client advertised for `kind`.
    pub fn max_version(&self, kind: PacketKind) -> Option<ProtocolVersion> {
        self.max_versions.get(&kind).copied()
    }
}

/// Versions the server can emit, per packet kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerCapabilities {
    /// Sorted ascending, never empty.
    versions: FxHashMap<PacketKind, Vec<ProtocolVersion>>,
}

impl ServerCapabilities {
    /// A table with no supported kinds.
    pub fn empty() -> Self {
        Self {
            versions: FxHashMap::default(),
        }
    }

    /// Declares the versions the server supports for `kind`, replacing any
    /// previous declaration. An empty list removes the kind.
    pub fn support(&mut self, kind: PacketKind, versions: &[ProtocolVersion]) {
        let mut versions = versions.to_vec();
        versions.sort_unstable();
        versions.dedup();
        if versions.is_empty() {
            self.versions.remove(&kind);
        } else {
            self.versions.insert(kind, versions);
        }
    }

    /// Highest version supported by both sides, or `None` when the client
    /// never advertised `kind` or the ranges do not overlap.
    ///
    /// Pure lookup, no state mutation.
    pub fn negotiate(
        &self,
        client: &ClientCapabilities,
        kind: PacketKind,
    ) -> Option<ProtocolVersion> {
        let client_max = client.max_version(kind)?;
        self.versions
            .get(&kind)?
            .iter()
            .rev()
            .find(|v| **v <= client_max)
            .copied()
    }
}

impl Default for ServerCapabilities {
    /// Every kind at version 0.
    fn default() -> Self {
        let mut caps = Self::empty();
        for kind in PacketKind::ALL {
            caps.support(kind, &[ProtocolVersion(0)]);
        }
        caps
    }
}
