//! The sync core's view of one connected client.

use std::fmt;

use mirage_net::{
    ClientProfile, PacketKind, PacketSink, ProtocolVersion, ServerCapabilities, encode_packet,
};
use serde::Serialize;

/// A client profile, the server's capability table, and the client's
/// outgoing packet sink.
///
/// Every emission in this crate goes through [`ClientConnection::negotiate`]
/// first and is skipped entirely when it returns `None`.
pub struct ClientConnection<'a> {
    profile: &'a ClientProfile,
    server: &'a ServerCapabilities,
    sink: &'a mut dyn PacketSink,
    sent: usize,
}

impl<'a> ClientConnection<'a> {
    /// Wraps a client for the duration of one operation or sync sequence.
    pub fn new(
        profile: &'a ClientProfile,
        server: &'a ServerCapabilities,
        sink: &'a mut dyn PacketSink,
    ) -> Self {
        Self {
            profile,
            server,
            sink,
            sent: 0,
        }
    }

    /// The client being synced.
    pub fn profile(&self) -> &'a ClientProfile {
        self.profile
    }

    /// Highest version of `kind` both sides support.
    pub fn negotiate(&self, kind: PacketKind) -> Option<ProtocolVersion> {
        self.server.negotiate(&self.profile.capabilities, kind)
    }

    /// Returns `true` if `kind` negotiates to some version.
    pub fn supports(&self, kind: PacketKind) -> bool {
        self.negotiate(kind).is_some()
    }

    /// Encodes `payload` at `version` and hands it to the sink.
    ///
    /// Encode failures are logged and the packet is dropped.
    pub fn send<T: Serialize + ?Sized>(
        &mut self,
        kind: PacketKind,
        version: ProtocolVersion,
        payload: &T,
    ) -> bool {
        match encode_packet(kind, version, payload) {
            Ok(packet) => {
                self.sink.send(packet);
                self.sent += 1;
                true
            }
            Err(e) => {
                tracing::warn!(?kind, client = %self.profile.name, "dropping packet: {e}");
                false
            }
        }
    }

    /// Negotiates `kind` and sends `payload` if supported.
    pub fn send_negotiated<T: Serialize + ?Sized>(&mut self, kind: PacketKind, payload: &T) -> bool {
        match self.negotiate(kind) {
            Some(version) => self.send(kind, version, payload),
            None => false,
        }
    }

    /// Packets handed to the sink so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl fmt::Debug for ClientConnection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("client", &self.profile.id)
            .field("sent", &self.sent)
            .finish_non_exhaustive()
    }
}
