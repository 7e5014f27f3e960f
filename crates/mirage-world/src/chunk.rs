//! Chunk columns made of optional sections.

use crate::pos::{BlockPos, ChunkPos, ChunkSectionPos};
use crate::section::{ChunkSection, SectionView};

/// Errors from chunk writes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SectionError {
    /// The block lies in a different chunk column.
    #[error("block {pos:?} is outside chunk {chunk:?}")]
    WrongChunk {
        /// Offending position.
        pos: BlockPos,
        /// Chunk that was written to.
        chunk: ChunkPos,
    },

    /// The block's section index is outside the chunk's vertical range.
    #[error("section y {section_y} outside [{min}, {max})")]
    OutOfHeight {
        /// Requested section y.
        section_y: i32,
        /// Lowest section y.
        min: i32,
        /// One past the highest section y.
        max: i32,
    },
}

/// Read access to a chunk, as needed by full-section resyncs.
pub trait ChunkView {
    /// Section type.
    type Section: SectionView;

    /// Returns `true` if any section holds a synchronizable state.
    fn has_any(&self) -> bool;

    /// Present sections with their coordinates, bottom to top.
    fn sections(&self) -> impl Iterator<Item = (ChunkSectionPos, &Self::Section)> + '_;
}

/// A vertical column of sections.
#[derive(Clone, Debug)]
pub struct Chunk {
    pos: ChunkPos,
    min_section_y: i32,
    sections: Vec<Option<ChunkSection>>,
}

impl Chunk {
    /// An empty column spanning `section_count` sections from `min_section_y`.
    pub fn new(pos: ChunkPos, min_section_y: i32, section_count: usize) -> Self {
        Self {
            pos,
            min_section_y,
            sections: vec![None; section_count],
        }
    }

    /// Column position.
    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    fn max_section_y(&self) -> i32 {
        let len = i32::try_from(self.sections.len()).unwrap_or(i32::MAX);
        self.min_section_y.saturating_add(len)
    }

    fn slot(&self, pos: BlockPos) -> Result<usize, SectionError> {
        let section = pos.section();
        if section.x != self.pos.x || section.z != self.pos.z {
            return Err(SectionError::WrongChunk {
                pos,
                chunk: self.pos,
            });
        }
        if section.y < self.min_section_y || section.y >= self.max_section_y() {
            return Err(SectionError::OutOfHeight {
                section_y: section.y,
                min: self.min_section_y,
                max: self.max_section_y(),
            });
        }
        Ok((section.y - self.min_section_y) as usize)
    }

    /// Writes a block state, allocating its section on first write.
    ///
    /// Returns the previous raw state id.
    pub fn set_block(
        &mut self,
        pos: BlockPos,
        raw_state_id: u32,
        synchronizable: bool,
    ) -> Result<u32, SectionError> {
        let slot = self.slot(pos)?;
        let section = self.sections[slot].get_or_insert_with(ChunkSection::new);
        Ok(section.set_state(pos.local(), raw_state_id, synchronizable))
    }

    /// Raw state id at `pos`; unallocated sections read as 0.
    ///
    /// Out-of-range positions log a warning and read as 0.
    pub fn block(&self, pos: BlockPos) -> u32 {
        match self.slot(pos) {
            Ok(slot) => self.sections[slot]
                .as_ref()
                .map_or(0, |section| section.state(pos.local())),
            Err(err) => {
                tracing::warn!("Chunk::block: {err}");
                0
            }
        }
    }

    /// Section at section index `section_y`, if allocated.
    pub fn section(&self, section_y: i32) -> Option<&ChunkSection> {
        let offset = section_y.checked_sub(self.min_section_y)?;
        let slot = usize::try_from(offset).ok()?;
        self.sections.get(slot)?.as_ref()
    }
}

impl ChunkView for Chunk {
    type Section = ChunkSection;

    fn has_any(&self) -> bool {
        self.sections.iter().flatten().any(SectionView::has_any)
    }

    fn sections(&self) -> impl Iterator<Item = (ChunkSectionPos, &ChunkSection)> + '_ {
        self.sections.iter().enumerate().filter_map(|(i, section)| {
            section.as_ref().map(|s| {
                (
                    ChunkSectionPos::of(self.pos, self.min_section_y + i as i32),
                    s,
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk() -> Chunk {
        Chunk::new(ChunkPos { x: 0, z: -1 }, -4, 24)
    }

    #[test]
    fn test_set_and_read_block() {
        let mut chunk = chunk();
        let pos = BlockPos::new(10, 64, -3);
        assert_eq!(chunk.set_block(pos, 77, true), Ok(0));
        assert_eq!(chunk.block(pos), 77);
        assert!(chunk.has_any());
        assert!(chunk.section(4).is_some());
        assert!(chunk.section(3).is_none());
    }

    #[test]
    fn test_wrong_chunk_rejected() {
        let mut chunk = chunk();
        let err = chunk.set_block(BlockPos::new(16, 0, -3), 1, true).unwrap_err();
        assert!(matches!(err, SectionError::WrongChunk { .. }));
        assert_eq!(chunk.block(BlockPos::new(16, 0, -3)), 0);
    }

    #[test]
    fn test_height_bounds() {
        let mut chunk = chunk();
        assert!(matches!(
            chunk.set_block(BlockPos::new(0, -65, -1), 1, false),
            Err(SectionError::OutOfHeight { section_y: -5, .. })
        ));
        assert!(matches!(
            chunk.set_block(BlockPos::new(0, 320, -1), 1, false),
            Err(SectionError::OutOfHeight { section_y: 20, .. })
        ));
        assert!(chunk.set_block(BlockPos::new(0, 319, -1), 1, false).is_ok());
    }

    #[test]
    fn test_section_lookup_at_extreme_heights() {
        let mut chunk = Chunk::new(ChunkPos { x: 0, z: 0 }, -4, 24);
        chunk.set_block(BlockPos::new(0, -64, 0), 9, true).unwrap();
        assert!(chunk.section(-4).is_some());
        assert!(chunk.section(i32::MAX).is_none());
        assert!(chunk.section(i32::MIN).is_none());
        assert!(chunk.section(20).is_none());
    }

    #[test]
    fn test_sections_yield_coordinates_bottom_up() {
        let mut chunk = chunk();
        chunk.set_block(BlockPos::new(0, 100, -16), 5, true).unwrap();
        chunk.set_block(BlockPos::new(0, -60, -16), 5, false).unwrap();

        let positions: Vec<_> = chunk.sections().map(|(pos, _)| pos).collect();
        assert_eq!(
            positions,
            [
                ChunkSectionPos { x: 0, y: -4, z: -1 },
                ChunkSectionPos { x: 0, y: 6, z: -1 },
            ]
        );
    }

    #[test]
    fn test_has_any_only_counts_synchronizable() {
        let mut chunk = chunk();
        chunk.set_block(BlockPos::new(0, 0, -1), 5, false).unwrap();
        assert!(!chunk.has_any());
    }
}
