//! Registry entries and the per-entry visibility predicate.

use std::fmt;
use std::sync::Arc;

use mirage_net::{ClientProfile, Identifier};

use crate::tier::Tier;

/// Per-entry capability query against the receiving client.
///
/// Supplied by the domain object that owns the entry. Entries without a
/// predicate are visible to every client.
pub type VisibilityFn = dyn Fn(&ClientProfile) -> bool + Send + Sync;

/// Kind-specific backing data used to build richer sync records.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum EntryData {
    /// No extra data; only raw id + identifier can be synced.
    #[default]
    Plain,
    /// An item and the baseline item shown in its place.
    Item {
        /// Baseline client item.
        client_item: Identifier,
    },
    /// A block with its display name.
    Block {
        /// Untranslated display name.
        name: String,
    },
    /// A block state of `block` with the given properties.
    BlockState {
        /// Owning block.
        block: Identifier,
        /// Property name/value pairs.
        properties: Vec<(String, String)>,
    },
    /// An entity type with its display name.
    Entity {
        /// Untranslated display name.
        name: String,
    },
}

/// One row of a registry table.
#[derive(Clone)]
pub struct RegistryEntry {
    raw_id: u32,
    id: Identifier,
    tier: Tier,
    data: EntryData,
    visibility: Option<Arc<VisibilityFn>>,
}

impl RegistryEntry {
    /// A plain, vanilla-tier entry visible to everyone.
    pub fn new(raw_id: u32, id: Identifier) -> Self {
        Self {
            raw_id,
            id,
            tier: Tier::VanillaOnly,
            data: EntryData::Plain,
            visibility: None,
        }
    }

    /// Attaches kind-specific data.
    pub fn with_data(mut self, data: EntryData) -> Self {
        self.data = data;
        self
    }

    /// Attaches a visibility predicate.
    pub fn with_visibility(
        mut self,
        predicate: impl Fn(&ClientProfile) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.visibility = Some(Arc::new(predicate));
        self
    }

    /// Shares an existing predicate (e.g. all states of one block).
    pub fn with_shared_visibility(mut self, predicate: Arc<VisibilityFn>) -> Self {
        self.visibility = Some(predicate);
        self
    }

    pub(crate) fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Raw numeric id.
    pub fn raw_id(&self) -> u32 {
        self.raw_id
    }

    /// Identifier.
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Stored tier.
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Backing data.
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// Whether the entry is in the synchronizable subset.
    pub fn is_synchronizable(&self) -> bool {
        self.tier.is_synchronizable()
    }

    /// Evaluates the visibility predicate for `client`.
    pub fn is_visible_to(&self, client: &ClientProfile) -> bool {
        self.visibility.as_ref().is_none_or(|pred| pred(client))
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("raw_id", &self.raw_id)
            .field("id", &self.id)
            .field("tier", &self.tier)
            .field("data", &self.data)
            .field("has_visibility", &self.visibility.is_some())
            .finish()
    }
}
