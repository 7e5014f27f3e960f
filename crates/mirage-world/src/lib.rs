//! Block and section coordinates, the packed local-position format, and
//! chunk sections that index their synchronizable block states.

pub mod chunk;
pub mod pos;
pub mod section;

pub use chunk::{Chunk, ChunkView, SectionError};
pub use pos::{
    BlockPos, ChunkPos, ChunkSectionPos, LocalPos, SECTION_SIZE, pack_state, unpack_state,
};
pub use section::{ChunkSection, SECTION_VOLUME, SectionView};
