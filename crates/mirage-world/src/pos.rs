//! World coordinates and the packed section-update format.
//!
//! A [`LocalPos`] packs into 12 bits as `x << 8 | z << 4 | y`. A section
//! update entry packs a raw state id above those 12 bits:
//!
//! ```text
//!  63                              12 11    8 7     4 3     0
//! +----------------------------------+-------+-------+-------+
//! |          raw state id            |   x   |   z   |   y   |
//! +----------------------------------+-------+-------+-------+
//! ```
//!
//! This layout is part of the wire format and must not change.

use serde::{Deserialize, Serialize};

/// Edge length of a section in blocks.
pub const SECTION_SIZE: i32 = 16;

/// Absolute block position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// X.
    pub x: i32,
    /// Y.
    pub y: i32,
    /// Z.
    pub z: i32,
}

impl BlockPos {
    /// Creates a position.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Section containing this block.
    pub fn section(self) -> ChunkSectionPos {
        ChunkSectionPos {
            x: self.x.div_euclid(SECTION_SIZE),
            y: self.y.div_euclid(SECTION_SIZE),
            z: self.z.div_euclid(SECTION_SIZE),
        }
    }

    /// Position of this block inside its section.
    pub fn local(self) -> LocalPos {
        LocalPos {
            x: self.x.rem_euclid(SECTION_SIZE) as u8,
            y: self.y.rem_euclid(SECTION_SIZE) as u8,
            z: self.z.rem_euclid(SECTION_SIZE) as u8,
        }
    }
}

/// Column coordinate of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    /// Chunk X.
    pub x: i32,
    /// Chunk Z.
    pub z: i32,
}

/// Coordinate of a 16³ section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSectionPos {
    /// Section X.
    pub x: i32,
    /// Section Y.
    pub y: i32,
    /// Section Z.
    pub z: i32,
}

impl ChunkSectionPos {
    /// Section `y` of chunk column `chunk`.
    pub const fn of(chunk: ChunkPos, y: i32) -> Self {
        Self {
            x: chunk.x,
            y,
            z: chunk.z,
        }
    }

    /// Absolute position of `local` inside this section.
    pub fn block(self, local: LocalPos) -> BlockPos {
        BlockPos {
            x: self.x * SECTION_SIZE + i32::from(local.x),
            y: self.y * SECTION_SIZE + i32::from(local.y),
            z: self.z * SECTION_SIZE + i32::from(local.z),
        }
    }
}

/// Block position inside a section, each axis in `[0, 16)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPos {
    x: u8,
    y: u8,
    z: u8,
}

impl LocalPos {
    /// Creates a local position, or `None` if any axis is `>= 16`.
    pub fn new(x: u8, y: u8, z: u8) -> Option<Self> {
        (x < 16 && y < 16 && z < 16).then_some(Self { x, y, z })
    }

    /// Local X.
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Local Y.
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Local Z.
    pub const fn z(self) -> u8 {
        self.z
    }

    /// 12-bit packed form: `x << 8 | z << 4 | y`.
    pub const fn pack(self) -> u16 {
        (((self.x & 0xF) as u16) << 8) | (((self.z & 0xF) as u16) << 4) | (self.y & 0xF) as u16
    }

    /// Inverse of [`LocalPos::pack`]. Bits above the low 12 are ignored.
    pub const fn unpack(packed: u16) -> Self {
        Self {
            x: ((packed >> 8) & 0xF) as u8,
            y: (packed & 0xF) as u8,
            z: ((packed >> 4) & 0xF) as u8,
        }
    }
}

/// Packs a raw state id and local position: `(raw_state_id << 12) | local12`.
pub const fn pack_state(raw_state_id: u32, local: LocalPos) -> u64 {
    ((raw_state_id as u64) << 12) | local.pack() as u64
}

/// Inverse of [`pack_state`].
pub const fn unpack_state(packed: u64) -> (u32, LocalPos) {
    ((packed >> 12) as u32, LocalPos::unpack((packed & 0xFFF) as u16))
}
