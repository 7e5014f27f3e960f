//! Outgoing packet sinks.
//!
//! The sync core only ever calls [`PacketSink::send`]. Sending is
//! fire-and-forget: the sink hands the packet to the transport's own queue and
//! never blocks the caller.

use tokio::sync::mpsc;

use crate::packet::Packet;

/// Destination for encoded packets of one client.
pub trait PacketSink {
    /// Submits a packet. Must not block.
    fn send(&mut self, packet: Packet);
}

/// Recording sink, used by tests and diagnostics.
impl PacketSink for Vec<Packet> {
    fn send(&mut self, packet: Packet) {
        self.push(packet);
    }
}

/// Sink that pushes into an unbounded tokio channel drained by the
/// connection's writer task (see [`crate::framing::run_writer`]).
#[derive(Clone, Debug)]
pub struct QueueSink {
    tx: mpsc::UnboundedSender<Packet>,
}

impl QueueSink {
    /// Creates a sink and the receiving end for the writer task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Packet>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns `true` once the writer task has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PacketSink for QueueSink {
    fn send(&mut self, packet: Packet) {
        // A closed queue means the client disconnected; the packet is moot.
        if self.tx.send(packet).is_err() {
            tracing::trace!("dropping packet for closed connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketKind;

    fn packet(kind: PacketKind) -> Packet {
        Packet {
            kind,
            payload: vec![0],
        }
    }

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut sink: Vec<Packet> = Vec::new();
        sink.send(packet(PacketKind::SyncStarted));
        sink.send(packet(PacketKind::SyncFinished));
        let kinds: Vec<_> = sink.iter().map(|p| p.kind).collect();
        assert_eq!(kinds, [PacketKind::SyncStarted, PacketKind::SyncFinished]);
    }

    #[tokio::test]
    async fn test_queue_sink_delivers() {
        let (mut sink, mut rx) = QueueSink::new();
        sink.send(packet(PacketKind::SyncClear));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, PacketKind::SyncClear);
    }

    #[test]
    fn test_queue_sink_after_disconnect_does_not_panic() {
        let (mut sink, rx) = QueueSink::new();
        drop(rx);
        assert!(sink.is_closed());
        sink.send(packet(PacketKind::SyncInfo));
    }
}
