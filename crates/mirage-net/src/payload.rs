//! Payload structs for every packet kind.
//!
//! These are plain serde types; [`crate::codec::encode_packet`] wraps them in
//! the versioned envelope.

use serde::{Deserialize, Serialize};

use crate::Identifier;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Payload of packets that carry no data (Started, Finished, Clear, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty;

/// Global synchronization info.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncInfo {
    /// Raw id at which server-only block states begin.
    pub block_state_offset: u32,
}

// ---------------------------------------------------------------------------
// Registry tables
// ---------------------------------------------------------------------------

/// A count-prefixed list of registry records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncBatch<T> {
    /// Records in registration order.
    pub entries: Vec<T>,
}

/// Minimal registry record: raw id + identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdValueEntry {
    /// Server-side raw id.
    pub raw_id: u32,
    /// Server-side identifier.
    pub id: Identifier,
}

/// Item record with the baseline item the client renders instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemEntry {
    /// Server-side raw id.
    pub raw_id: u32,
    /// Server-side identifier.
    pub id: Identifier,
    /// Baseline client item used as the visual stand-in.
    pub client_item: Identifier,
}

/// Block record with its display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockEntry {
    /// Server-side raw id.
    pub raw_id: u32,
    /// Server-side identifier.
    pub id: Identifier,
    /// Untranslated display name.
    pub name: String,
}

/// Block-state record linking a raw state id to its block and properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockStateEntry {
    /// Raw state id.
    pub raw_state_id: u32,
    /// Raw id of the owning block.
    pub block_raw_id: u32,
    /// Property name/value pairs, sorted by name.
    pub properties: Vec<(String, String)>,
}

/// Entity-type record with its display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityEntry {
    /// Server-side raw id.
    pub raw_id: u32,
    /// Server-side identifier.
    pub id: Identifier,
    /// Untranslated display name.
    pub name: String,
}

/// One tag and the raw ids of its members.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagPayload {
    /// Tag identifier.
    pub id: Identifier,
    /// Member raw ids in declaration order.
    pub members: Vec<u32>,
}

/// All tags of one registry (one record of the Tags sync).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagEntry {
    /// Identifier of the registry the tags belong to.
    pub registry: Identifier,
    /// Tags of that registry.
    pub tags: Vec<TagPayload>,
}

/// Unfiltered block-state record used by the debug validation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugStateEntry {
    /// Raw state id.
    pub raw_state_id: u32,
    /// Identifier of the owning block.
    pub block: Identifier,
    /// Property name/value pairs, sorted by name.
    pub properties: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// Item groups
// ---------------------------------------------------------------------------

/// Reference to an item as shown in group icons and contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ItemRef {
    /// Item identifier.
    pub item: Identifier,
    /// Stack size.
    pub count: u32,
}

impl ItemRef {
    /// A single item of the given type.
    pub fn single(item: Identifier) -> Self {
        Self { item, count: 1 }
    }
}

/// Payload carrying only a group identifier (remove, contents clear).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupId {
    /// Group identifier.
    pub id: Identifier,
}

/// Group definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupDefine {
    /// Group identifier.
    pub id: Identifier,
    /// Display name already localized for the receiving client.
    pub display_name: String,
    /// Icon item.
    pub icon: ItemRef,
}

/// Group contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupContents {
    /// Group identifier.
    pub id: Identifier,
    /// Items in display order.
    pub items: Vec<ItemRef>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Single block update at an absolute position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockUpdate {
    /// Absolute X.
    pub x: i32,
    /// Absolute Y.
    pub y: i32,
    /// Absolute Z.
    pub z: i32,
    /// Raw state id.
    pub raw_state_id: u32,
}

/// Multi-block update for one 16³ section.
///
/// Each `packed` value is `(raw_state_id << 12) | local_pos12`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionUpdate {
    /// Section X.
    pub section_x: i32,
    /// Section Y.
    pub section_y: i32,
    /// Section Z.
    pub section_z: i32,
    /// Packed position/state values.
    pub packed: Vec<u64>,
}

/// Entity spawn information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityInfo {
    /// Numeric entity id in the world.
    pub entity_id: i32,
    /// Server-side entity type.
    pub entity_type: Identifier,
}
