//! Splits registry tables into bounded packets.

use std::sync::Arc;

use mirage_net::PacketKind;
use mirage_net::payload::SyncBatch;
use mirage_registry::{RegistryEntry, RegistryKind, RegistrySnapshot};
use serde::Serialize;

use crate::connection::ClientConnection;

/// A batch is flushed once it holds more than this many entries.
///
/// The check runs after each insertion, so a flushed batch carries
/// `MAX_BATCH_ENTRIES + 1` entries. Clients rely on that packet size.
pub const MAX_BATCH_ENTRIES: usize = 100;

/// Encodes entry sequences into [`SyncBatch`] packets for one snapshot.
#[derive(Clone, Copy, Debug)]
pub struct BatchEncoder<'a> {
    snapshot: &'a RegistrySnapshot,
}

impl<'a> BatchEncoder<'a> {
    /// Encoder reading membership from `snapshot`.
    pub fn new(snapshot: &'a RegistrySnapshot) -> Self {
        Self { snapshot }
    }

    /// Sends `entries` of `registry` as `kind` packets.
    ///
    /// Unless `bypass_filter` is set, entries outside the synchronizable set
    /// or hidden from the client are skipped before `serialize` runs.
    /// Returns the number of packets sent.
    pub fn encode<'e, T, F>(
        &self,
        conn: &mut ClientConnection<'_>,
        kind: PacketKind,
        registry: RegistryKind,
        entries: impl IntoIterator<Item = &'e Arc<RegistryEntry>>,
        bypass_filter: bool,
        mut serialize: F,
    ) -> usize
    where
        T: Serialize,
        F: FnMut(&RegistryEntry) -> Option<T>,
    {
        let client = conn.profile();
        let snapshot = self.snapshot;
        let passing = entries.into_iter().filter(|entry| {
            bypass_filter
                || (snapshot.is_synchronizable(registry, entry.raw_id())
                    && entry.is_visible_to(client))
        });
        encode_batches(conn, kind, passing, |entry| serialize(&**entry))
    }
}

/// Sends already filtered `items` as `kind` packets, skipping items for
/// which `serialize` yields nothing.
///
/// Sends nothing if `kind` does not negotiate or no item serializes.
/// Returns the number of packets sent.
pub fn encode_batches<I, T, F>(
    conn: &mut ClientConnection<'_>,
    kind: PacketKind,
    items: I,
    mut serialize: F,
) -> usize
where
    I: IntoIterator,
    T: Serialize,
    F: FnMut(I::Item) -> Option<T>,
{
    let Some(version) = conn.negotiate(kind) else {
        tracing::debug!(?kind, client = %conn.profile().name, "skipping unsupported stage");
        return 0;
    };

    let mut batch = SyncBatch {
        entries: Vec::new(),
    };
    let mut packets = 0;
    for item in items {
        let Some(record) = serialize(item) else {
            tracing::trace!(?kind, "entry produced no payload");
            continue;
        };
        batch.entries.push(record);
        if batch.entries.len() > MAX_BATCH_ENTRIES {
            conn.send(kind, version, &batch);
            batch.entries.clear();
            packets += 1;
        }
    }
    if !batch.entries.is_empty() {
        conn.send(kind, version, &batch);
        packets += 1;
    }
    packets
}
