//! The logical registries tracked by the server.

use mirage_net::{Identifier, IdentifierError};

/// A logical identifier registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegistryKind {
    /// Enchantments.
    Enchantment,
    /// Items.
    Item,
    /// Blocks.
    Block,
    /// Block states (raw state ids).
    BlockState,
    /// Entity types.
    EntityType,
    /// Villager professions.
    VillagerProfession,
    /// Status effects.
    StatusEffect,
    /// Block-entity types.
    BlockEntityType,
    /// Fluids.
    Fluid,
}

impl RegistryKind {
    /// Number of registry kinds.
    pub const COUNT: usize = 9;

    /// All kinds in a fixed order (also the order of the Tags sync).
    pub const ALL: [RegistryKind; Self::COUNT] = [
        RegistryKind::Enchantment,
        RegistryKind::Item,
        RegistryKind::Block,
        RegistryKind::BlockState,
        RegistryKind::EntityType,
        RegistryKind::VillagerProfession,
        RegistryKind::StatusEffect,
        RegistryKind::BlockEntityType,
        RegistryKind::Fluid,
    ];

    /// Dense index into per-kind tables.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Path of the registry's identifier.
    pub fn path(self) -> &'static str {
        match self {
            RegistryKind::Enchantment => "enchantment",
            RegistryKind::Item => "item",
            RegistryKind::Block => "block",
            RegistryKind::BlockState => "block_state",
            RegistryKind::EntityType => "entity_type",
            RegistryKind::VillagerProfession => "villager_profession",
            RegistryKind::StatusEffect => "mob_effect",
            RegistryKind::BlockEntityType => "block_entity_type",
            RegistryKind::Fluid => "fluid",
        }
    }

    /// Identifier of the registry itself (used by the Tags sync).
    pub fn identifier(self) -> Result<Identifier, IdentifierError> {
        Identifier::vanilla(self.path())
    }
}
