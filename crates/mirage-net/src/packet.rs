//! Packet kinds of the synchronization protocol and the outgoing packet type.
//!
//! Every kind is negotiated and versioned independently. A kind has a stable
//! one-byte wire id (used by the framing layer) and a channel name (used in
//! the client's capability handshake).

use serde::{Deserialize, Serialize};

/// A negotiated protocol version for one packet kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolVersion(pub u8);

/// Every packet kind the server can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PacketKind {
    // --- Session ---
    /// First packet of a synchronization sequence.
    SyncStarted,
    /// Last packet of a synchronization sequence.
    SyncFinished,
    /// Client should drop every previously received mapping.
    SyncClear,
    /// Global information (block-state identifier offset).
    SyncInfo,

    // --- Registry tables ---
    /// Enchantment table.
    SyncEnchantment,
    /// Item table.
    SyncItem,
    /// Block table.
    SyncBlock,
    /// Block-state table.
    SyncBlockState,
    /// Entity-type table.
    SyncEntity,
    /// Villager-profession table.
    SyncVillagerProfession,
    /// Status-effect table.
    SyncStatusEffect,
    /// Block-entity-type table.
    SyncBlockEntity,
    /// Fluid table.
    SyncFluid,
    /// Tags of every registry.
    SyncTags,

    // --- Item groups ---
    /// Remove a group.
    GroupRemove,
    /// Define a group.
    GroupDefine,
    /// Clear the contents of a group.
    GroupContentsClear,
    /// Add contents to a group.
    GroupContentsAdd,
    /// Rebuild group UI after a batch of group updates.
    GroupApplyUpdate,

    // --- World ---
    /// Single block update.
    WorldSetBlock,
    /// Multi-block or whole-section update.
    WorldChunkSection,
    /// Entity spawn information.
    WorldEntity,

    // --- Debug ---
    /// Unfiltered block-state table for client-side validation.
    DebugValidateStates,
}

impl PacketKind {
    /// All kinds in wire-id order.
    pub const ALL: [PacketKind; 23] = [
        PacketKind::SyncStarted,
        PacketKind::SyncFinished,
        PacketKind::SyncClear,
        PacketKind::SyncInfo,
        PacketKind::SyncEnchantment,
        PacketKind::SyncItem,
        PacketKind::SyncBlock,
        PacketKind::SyncBlockState,
        PacketKind::SyncEntity,
        PacketKind::SyncVillagerProfession,
        PacketKind::SyncStatusEffect,
        PacketKind::SyncBlockEntity,
        PacketKind::SyncFluid,
        PacketKind::SyncTags,
        PacketKind::GroupRemove,
        PacketKind::GroupDefine,
        PacketKind::GroupContentsClear,
        PacketKind::GroupContentsAdd,
        PacketKind::GroupApplyUpdate,
        PacketKind::WorldSetBlock,
        PacketKind::WorldChunkSection,
        PacketKind::WorldEntity,
        PacketKind::DebugValidateStates,
    ];

    /// Stable one-byte identifier used by the framing layer.
    pub fn wire_id(self) -> u8 {
        self as u8
    }

    /// Inverse of [`PacketKind::wire_id`].
    pub fn from_wire_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Channel name advertised in the capability handshake.
    pub fn channel(self) -> &'static str {
        match self {
            PacketKind::SyncStarted => "mirage:sync/started",
            PacketKind::SyncFinished => "mirage:sync/finished",
            PacketKind::SyncClear => "mirage:sync/clear",
            PacketKind::SyncInfo => "mirage:sync/info",
            PacketKind::SyncEnchantment => "mirage:sync/enchantment",
            PacketKind::SyncItem => "mirage:sync/item",
            PacketKind::SyncBlock => "mirage:sync/block",
            PacketKind::SyncBlockState => "mirage:sync/blockstate",
            PacketKind::SyncEntity => "mirage:sync/entity",
            PacketKind::SyncVillagerProfession => "mirage:sync/villager_profession",
            PacketKind::SyncStatusEffect => "mirage:sync/status_effect",
            PacketKind::SyncBlockEntity => "mirage:sync/block_entity",
            PacketKind::SyncFluid => "mirage:sync/fluid",
            PacketKind::SyncTags => "mirage:sync/tags",
            PacketKind::GroupRemove => "mirage:sync/item_group/remove",
            PacketKind::GroupDefine => "mirage:sync/item_group/define",
            PacketKind::GroupContentsClear => "mirage:sync/item_group/contents/clear",
            PacketKind::GroupContentsAdd => "mirage:sync/item_group/contents/add",
            PacketKind::GroupApplyUpdate => "mirage:sync/item_group/apply_update",
            PacketKind::WorldSetBlock => "mirage:world/set_block",
            PacketKind::WorldChunkSection => "mirage:world/chunk_section",
            PacketKind::WorldEntity => "mirage:world/entity",
            PacketKind::DebugValidateStates => "mirage:debug/validate_states",
        }
    }

    /// Looks a kind up by its handshake channel name.
    pub fn from_channel(channel: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.channel() == channel)
    }
}

/// An encoded packet ready to be handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Kind of the packet.
    pub kind: PacketKind,
    /// Versioned envelope produced by [`crate::codec::encode_packet`].
    pub payload: Vec<u8>,
}
