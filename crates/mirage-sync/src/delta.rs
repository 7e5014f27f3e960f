//! World change packets: single blocks, section batches, full resyncs, and
//! entity spawn info.
//!
//! Every operation filters states through the same two checks: membership in
//! the synchronizable block-state set, then the state's visibility predicate
//! for the receiving client.

use mirage_net::PacketKind;
use mirage_net::payload::{BlockUpdate, EntityInfo, SectionUpdate};
use mirage_registry::{RegistryKind, RegistrySnapshot};
use mirage_world::{BlockPos, ChunkSectionPos, ChunkView, LocalPos, SectionView, pack_state};

use crate::connection::ClientConnection;

/// Encodes world deltas against one registry snapshot.
#[derive(Clone, Copy, Debug)]
pub struct DeltaEncoder<'a> {
    snapshot: &'a RegistrySnapshot,
}

impl<'a> DeltaEncoder<'a> {
    /// Encoder reading membership and visibility from `snapshot`.
    pub fn new(snapshot: &'a RegistrySnapshot) -> Self {
        Self { snapshot }
    }

    fn passes(&self, conn: &ClientConnection<'_>, raw_state_id: u32) -> bool {
        self.snapshot
            .is_visible(RegistryKind::BlockState, raw_state_id, conn.profile())
    }

    /// Sends one block change if the state passes the filter.
    pub fn single_block_update(
        &self,
        conn: &mut ClientConnection<'_>,
        pos: BlockPos,
        raw_state_id: u32,
    ) -> bool {
        let Some(version) = conn.negotiate(PacketKind::WorldSetBlock) else {
            return false;
        };
        if !self.passes(conn, raw_state_id) {
            return false;
        }
        let payload = BlockUpdate {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            raw_state_id,
        };
        conn.send(PacketKind::WorldSetBlock, version, &payload)
    }

    /// Sends the passing changes of one section as a single packet.
    ///
    /// `positions` and `states` are paired by index. Nothing is sent if no
    /// change passes.
    pub fn multi_block_update(
        &self,
        conn: &mut ClientConnection<'_>,
        section: ChunkSectionPos,
        positions: &[LocalPos],
        states: &[u32],
    ) -> bool {
        let Some(version) = conn.negotiate(PacketKind::WorldChunkSection) else {
            return false;
        };
        if positions.len() != states.len() {
            tracing::warn!(
                positions = positions.len(),
                states = states.len(),
                "mismatched section update, extra entries ignored"
            );
        }

        let packed: Vec<u64> = positions
            .iter()
            .zip(states)
            .filter(|(_, state)| self.passes(conn, **state))
            .map(|(pos, state)| pack_state(*state, *pos))
            .collect();
        if packed.is_empty() {
            return false;
        }
        conn.send(PacketKind::WorldChunkSection, version, &section_update(section, packed))
    }

    /// Sends one packet per section of `chunk` that holds at least one state
    /// visible to the client. Returns the number of packets sent.
    pub fn full_section_resync<C: ChunkView>(
        &self,
        conn: &mut ClientConnection<'_>,
        chunk: &C,
    ) -> usize {
        let Some(version) = conn.negotiate(PacketKind::WorldChunkSection) else {
            return 0;
        };
        if !chunk.has_any() {
            return 0;
        }

        let mut sent = 0;
        for (pos, section) in chunk.sections() {
            if !section.has_any() {
                continue;
            }
            let packed: Vec<u64> = section
                .synchronizable_positions()
                .filter_map(|local| {
                    let state = section.state(local);
                    self.passes(conn, state).then(|| pack_state(state, local))
                })
                .collect();
            if packed.is_empty() {
                continue;
            }
            if conn.send(PacketKind::WorldChunkSection, version, &section_update(pos, packed)) {
                sent += 1;
            }
        }
        sent
    }

    /// Tells the client the real type of a spawned entity whose type is
    /// virtual.
    pub fn send_entity_info(
        &self,
        conn: &mut ClientConnection<'_>,
        entity_id: i32,
        entity_type_raw_id: u32,
    ) -> bool {
        let Some(version) = conn.negotiate(PacketKind::WorldEntity) else {
            return false;
        };
        let table = self.snapshot.table(RegistryKind::EntityType);
        if !table.is_visible(entity_type_raw_id, conn.profile()) {
            return false;
        }
        let Some(entry) = table.get_by_raw(entity_type_raw_id) else {
            return false;
        };
        let payload = EntityInfo {
            entity_id,
            entity_type: entry.id().clone(),
        };
        conn.send(PacketKind::WorldEntity, version, &payload)
    }
}

fn section_update(pos: ChunkSectionPos, packed: Vec<u64>) -> SectionUpdate {
    SectionUpdate {
        section_x: pos.x,
        section_y: pos.y,
        section_z: pos.z,
        packed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_net::{
        ClientCapabilities, ClientId, ClientProfile, Identifier, Packet, ProtocolVersion,
        ServerCapabilities, decode_packet,
    };
    use mirage_registry::{EntryData, RegistryBuilder, RegistryEntry, Tier};
    use mirage_world::{Chunk, ChunkPos, unpack_state};

    const STONE: u32 = 1;
    const RUBY_ORE: u32 = 5000;
    const HIDDEN_ORE: u32 = 5001;

    fn id(path: &str) -> Identifier {
        Identifier::new("test", path).unwrap()
    }

    fn state(raw: u32, path: &str) -> RegistryEntry {
        RegistryEntry::new(raw, id(path)).with_data(EntryData::BlockState {
            block: id(path),
            properties: Vec::new(),
        })
    }

    fn snapshot() -> std::sync::Arc<RegistrySnapshot> {
        let mut builder = RegistryBuilder::new();
        builder
            .register(RegistryKind::BlockState, state(STONE, "stone"), Tier::VanillaOnly)
            .unwrap();
        builder
            .register(RegistryKind::BlockState, state(RUBY_ORE, "ruby_ore"), Tier::WithVirtual)
            .unwrap();
        builder
            .register(
                RegistryKind::BlockState,
                state(HIDDEN_ORE, "hidden_ore").with_visibility(|_| false),
                Tier::WithVirtual,
            )
            .unwrap();
        builder
            .register(
                RegistryKind::EntityType,
                RegistryEntry::new(90, id("golem")),
                Tier::WithVirtual,
            )
            .unwrap();
        builder
            .register(
                RegistryKind::EntityType,
                RegistryEntry::new(1, Identifier::vanilla("pig").unwrap()),
                Tier::VanillaOnly,
            )
            .unwrap();
        builder.build().snapshot()
    }

    fn client() -> ClientProfile {
        ClientProfile::new(ClientId(1), "alice", ClientCapabilities::all(ProtocolVersion(0)))
    }

    fn local(x: u8, y: u8, z: u8) -> LocalPos {
        LocalPos::new(x, y, z).unwrap()
    }

    #[test]
    fn test_single_update_requires_membership_and_visibility() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        let encoder = DeltaEncoder::new(&snapshot);
        let pos = BlockPos::new(10, 64, -3);

        assert!(!encoder.single_block_update(&mut conn, pos, STONE));
        assert!(!encoder.single_block_update(&mut conn, pos, HIDDEN_ORE));
        assert!(encoder.single_block_update(&mut conn, pos, RUBY_ORE));

        assert_eq!(sink.len(), 1);
        let (_, update): (_, BlockUpdate) = decode_packet(&sink[0].payload).unwrap();
        assert_eq!(
            update,
            BlockUpdate {
                x: 10,
                y: 64,
                z: -3,
                raw_state_id: RUBY_ORE,
            }
        );
    }

    #[test]
    fn test_multi_update_packs_passing_entries() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        let section = ChunkSectionPos { x: 2, y: -1, z: 7 };

        let sent = DeltaEncoder::new(&snapshot).multi_block_update(
            &mut conn,
            section,
            &[local(0, 0, 0), local(1, 2, 3), local(15, 15, 15)],
            &[RUBY_ORE, STONE, RUBY_ORE],
        );
        assert!(sent);

        let (_, update): (_, SectionUpdate) = decode_packet(&sink[0].payload).unwrap();
        assert_eq!((update.section_x, update.section_y, update.section_z), (2, -1, 7));
        let decoded: Vec<_> = update.packed.iter().map(|p| unpack_state(*p)).collect();
        assert_eq!(
            decoded,
            [(RUBY_ORE, local(0, 0, 0)), (RUBY_ORE, local(15, 15, 15))]
        );
    }

    #[test]
    fn test_multi_update_keeps_state_id_intact_at_section_edge() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        let edge = LocalPos::unpack(u16::MAX);

        assert!(DeltaEncoder::new(&snapshot).multi_block_update(
            &mut conn,
            ChunkSectionPos { x: 0, y: 0, z: 0 },
            &[edge, BlockPos::new(-1, -1, -1).local()],
            &[RUBY_ORE, RUBY_ORE],
        ));

        let (_, update): (_, SectionUpdate) = decode_packet(&sink[0].payload).unwrap();
        let decoded: Vec<_> = update.packed.iter().map(|p| unpack_state(*p)).collect();
        assert_eq!(decoded, [(RUBY_ORE, local(15, 15, 15)), (RUBY_ORE, local(15, 15, 15))]);
    }

    #[test]
    fn test_multi_update_with_nothing_passing_is_silent() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);

        let sent = DeltaEncoder::new(&snapshot).multi_block_update(
            &mut conn,
            ChunkSectionPos { x: 0, y: 0, z: 0 },
            &[local(0, 0, 0), local(1, 0, 0)],
            &[STONE, HIDDEN_ORE],
        );
        assert!(!sent);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_full_resync_skips_sections_without_visible_states() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);

        let mut chunk = Chunk::new(ChunkPos { x: 0, z: -1 }, -4, 24);
        // Section 4: one visible, one hidden.
        chunk.set_block(BlockPos::new(10, 64, -3), RUBY_ORE, true).unwrap();
        chunk.set_block(BlockPos::new(11, 64, -3), HIDDEN_ORE, true).unwrap();
        // Section 0: only hidden; has_any is set but nothing passes.
        chunk.set_block(BlockPos::new(0, 0, -16), HIDDEN_ORE, true).unwrap();
        // Section 1: only baseline.
        chunk.set_block(BlockPos::new(0, 16, -16), STONE, false).unwrap();

        let sent = DeltaEncoder::new(&snapshot).full_section_resync(&mut conn, &chunk);
        assert_eq!(sent, 1);

        let (_, update): (_, SectionUpdate) = decode_packet(&sink[0].payload).unwrap();
        assert_eq!((update.section_x, update.section_y, update.section_z), (0, 4, -1));
        assert_eq!(update.packed, [pack_state(RUBY_ORE, local(10, 0, 13))]);
    }

    #[test]
    fn test_unsupported_world_kinds_send_nothing() {
        let snapshot = snapshot();
        let client = ClientProfile::new(ClientId(3), "dave", ClientCapabilities::none());
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        let encoder = DeltaEncoder::new(&snapshot);

        let mut chunk = Chunk::new(ChunkPos { x: 0, z: 0 }, 0, 16);
        chunk.set_block(BlockPos::new(0, 0, 0), RUBY_ORE, true).unwrap();

        assert!(!encoder.single_block_update(&mut conn, BlockPos::new(0, 0, 0), RUBY_ORE));
        assert_eq!(encoder.full_section_resync(&mut conn, &chunk), 0);
        assert!(!encoder.send_entity_info(&mut conn, 12, 90));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_entity_info_only_for_virtual_types() {
        let snapshot = snapshot();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        let encoder = DeltaEncoder::new(&snapshot);

        assert!(!encoder.send_entity_info(&mut conn, 11, 1));
        assert!(encoder.send_entity_info(&mut conn, 12, 90));

        let (_, info): (_, EntityInfo) = decode_packet(&sink[0].payload).unwrap();
        assert_eq!(info.entity_id, 12);
        assert_eq!(info.entity_type, id("golem"));
    }
}
