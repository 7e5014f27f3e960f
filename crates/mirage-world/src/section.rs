//! 16³ block-state storage with an index of synchronizable positions.

use std::collections::BTreeSet;

use crate::pos::LocalPos;

/// Number of blocks in one section.
pub const SECTION_VOLUME: usize = 4096;

/// Read access to a section, as needed by full-section resyncs.
pub trait SectionView {
    /// Returns `true` if any block in the section holds a synchronizable state.
    fn has_any(&self) -> bool;

    /// Raw state id at `local`.
    fn state(&self, local: LocalPos) -> u32;

    /// Positions holding synchronizable states, in ascending packed order.
    fn synchronizable_positions(&self) -> impl Iterator<Item = LocalPos> + '_;
}

/// Flat block-state storage for one section.
///
/// The position index is maintained on every write, so full resyncs never
/// scan all 4096 blocks.
#[derive(Clone, Debug)]
pub struct ChunkSection {
    states: Box<[u32]>,
    /// Packed local positions whose state is synchronizable.
    tracked: BTreeSet<u16>,
}

impl Default for ChunkSection {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkSection {
    /// A section filled with raw state 0.
    pub fn new() -> Self {
        Self::filled(0)
    }

    /// A section filled with `raw_state_id`, none of it synchronizable.
    pub fn filled(raw_state_id: u32) -> Self {
        Self {
            states: vec![raw_state_id; SECTION_VOLUME].into_boxed_slice(),
            tracked: BTreeSet::new(),
        }
    }

    /// Writes `raw_state_id` at `local` and updates the position index.
    ///
    /// Returns the previous raw state id.
    pub fn set_state(&mut self, local: LocalPos, raw_state_id: u32, synchronizable: bool) -> u32 {
        let index = local.pack();
        let previous = std::mem::replace(&mut self.states[usize::from(index)], raw_state_id);
        if synchronizable {
            self.tracked.insert(index);
        } else {
            self.tracked.remove(&index);
        }
        previous
    }

    /// Number of tracked positions.
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }
}

impl SectionView for ChunkSection {
    fn has_any(&self) -> bool {
        !self.tracked.is_empty()
    }

    fn state(&self, local: LocalPos) -> u32 {
        self.states[usize::from(local.pack())]
    }

    fn synchronizable_positions(&self) -> impl Iterator<Item = LocalPos> + '_ {
        self.tracked.iter().map(|packed| LocalPos::unpack(*packed))
    }
}
