//! A single registry's entry table plus its derived synchronizable subset.

use std::sync::Arc;

use mirage_net::{ClientProfile, Identifier};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::entry::RegistryEntry;
use crate::error::RegistryError;
use crate::tier::Tier;

/// Outcome of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A new entry was appended.
    Inserted,
    /// An existing entry was replaced with an equal-or-higher tier.
    Updated,
    /// The proposed tier ranked below the stored one; nothing changed.
    Rejected,
}

/// Entry table of one registry.
///
/// Entries keep their registration order for the lifetime of the table. The
/// synchronizable subset is kept in that same order so that repeated syncs of
/// unchanged state produce identical output.
#[derive(Clone, Debug, Default)]
pub struct RegistryTable {
    entries: Vec<Arc<RegistryEntry>>,
    by_id: FxHashMap<Identifier, usize>,
    by_raw: FxHashMap<u32, usize>,
    /// Indices into `entries`, ascending.
    synchronizable: Vec<usize>,
    synchronizable_raw: FxHashSet<u32>,
    status: Tier,
    tags: Vec<(Identifier, Vec<Identifier>)>,
}

impl RegistryTable {
    /// Inserts or updates `entry` with `tier`, enforcing the can-replace rule.
    pub(crate) fn register(
        &mut self,
        entry: RegistryEntry,
        tier: Tier,
    ) -> Result<Registration, RegistryError> {
        let entry = entry.with_tier(tier);

        if let Some(&index) = self.by_id.get(entry.id()) {
            let current = &self.entries[index];
            if !tier.can_replace(current.tier()) {
                tracing::debug!(
                    id = %entry.id(),
                    current = ?current.tier(),
                    proposed = ?tier,
                    "rejected tier downgrade"
                );
                return Ok(Registration::Rejected);
            }
            if current.raw_id() != entry.raw_id() {
                return Err(RegistryError::RawIdChanged {
                    id: entry.id().clone(),
                    old: current.raw_id(),
                    new: entry.raw_id(),
                });
            }

            let was_synchronizable = current.is_synchronizable();
            self.entries[index] = Arc::new(entry);
            if !was_synchronizable && tier.is_synchronizable() {
                let pos = self.synchronizable.partition_point(|i| *i < index);
                self.synchronizable.insert(pos, index);
                self.synchronizable_raw.insert(self.entries[index].raw_id());
            }
            self.status = self.status.max(tier);
            return Ok(Registration::Updated);
        }

        if let Some(&other) = self.by_raw.get(&entry.raw_id()) {
            return Err(RegistryError::RawIdTaken {
                raw_id: entry.raw_id(),
                owner: self.entries[other].id().clone(),
            });
        }

        let index = self.entries.len();
        self.by_id.insert(entry.id().clone(), index);
        self.by_raw.insert(entry.raw_id(), index);
        if tier.is_synchronizable() {
            self.synchronizable.push(index);
            self.synchronizable_raw.insert(entry.raw_id());
        }
        self.status = self.status.max(tier);
        self.entries.push(Arc::new(entry));
        Ok(Registration::Inserted)
    }

    /// Declares or replaces a tag.
    pub(crate) fn register_tag(&mut self, tag: Identifier, members: Vec<Identifier>) {
        match self.tags.iter_mut().find(|(id, _)| *id == tag) {
            Some((_, existing)) => *existing = members,
            None => self.tags.push((tag, members)),
        }
    }

    /// Every entry, in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Arc<RegistryEntry>> {
        self.entries.iter()
    }

    /// Entries whose tier is not `VanillaOnly`, in registration order.
    pub fn synchronizable_entries(&self) -> impl Iterator<Item = &Arc<RegistryEntry>> {
        self.synchronizable.iter().map(|i| &self.entries[*i])
    }

    /// O(1) membership test in the synchronizable subset.
    pub fn is_synchronizable(&self, raw_id: u32) -> bool {
        self.synchronizable_raw.contains(&raw_id)
    }

    /// Synchronizable AND visible to `client`.
    pub fn is_visible(&self, raw_id: u32, client: &ClientProfile) -> bool {
        self.is_synchronizable(raw_id)
            && self
                .get_by_raw(raw_id)
                .is_some_and(|entry| entry.is_visible_to(client))
    }

    /// Looks an entry up by raw id.
    pub fn get_by_raw(&self, raw_id: u32) -> Option<&Arc<RegistryEntry>> {
        self.by_raw.get(&raw_id).map(|i| &self.entries[*i])
    }

    /// Looks an entry up by identifier.
    pub fn get(&self, id: &Identifier) -> Option<&Arc<RegistryEntry>> {
        self.by_id.get(id).map(|i| &self.entries[*i])
    }

    /// Aggregate status: the highest tier ever accepted in this registry.
    pub fn status(&self) -> Tier {
        self.status
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `VanillaOnly` entries.
    pub fn vanilla_len(&self) -> usize {
        self.entries.len() - self.synchronizable.len()
    }

    /// Tags in declaration order, with members resolved to raw ids.
    ///
    /// Members that are not registered are dropped.
    pub fn resolved_tags(&self) -> impl Iterator<Item = (&Identifier, Vec<u32>)> {
        self.tags.iter().map(|(tag, members)| {
            let raw = members
                .iter()
                .filter_map(|m| self.get(m).map(|e| e.raw_id()))
                .collect();
            (tag, raw)
        })
    }

    /// Returns `true` if at least one tag is declared.
    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(path: &str) -> Identifier {
        Identifier::new("test", path).unwrap()
    }

    fn entry(raw: u32, path: &str) -> RegistryEntry {
        RegistryEntry::new(raw, id(path))
    }

    #[test]
    fn test_synchronizable_excludes_vanilla() {
        let mut table = RegistryTable::default();
        table.register(entry(0, "stone"), Tier::VanillaOnly).unwrap();
        table.register(entry(1, "ruby"), Tier::WithVirtual).unwrap();
        table.register(entry(2, "dirt"), Tier::VanillaOnly).unwrap();
        table.register(entry(3, "modded"), Tier::WithExternalMods).unwrap();

        let ids: Vec<_> = table
            .synchronizable_entries()
            .map(|e| e.id().path().to_string())
            .collect();
        assert_eq!(ids, ["ruby", "modded"]);
        assert!(!table.is_synchronizable(0));
        assert!(table.is_synchronizable(1));
        assert_eq!(table.vanilla_len(), 2);
    }

    #[test]
    fn test_downgrade_is_rejected() {
        let mut table = RegistryTable::default();
        table.register(entry(5, "ruby"), Tier::WithExternalMods).unwrap();
        let result = table.register(entry(5, "ruby"), Tier::WithVirtual).unwrap();
        assert_eq!(result, Registration::Rejected);
        assert_eq!(table.get(&id("ruby")).unwrap().tier(), Tier::WithExternalMods);
    }

    #[test]
    fn test_final_tier_is_maximum_requested() {
        let mut table = RegistryTable::default();
        let requests = [
            Tier::VanillaOnly,
            Tier::WithExternalMods,
            Tier::VanillaOnly,
            Tier::WithVirtual,
        ];
        for tier in requests {
            table.register(entry(9, "x"), tier).unwrap();
        }
        assert_eq!(table.get(&id("x")).unwrap().tier(), Tier::WithExternalMods);
        assert_eq!(table.status(), Tier::WithExternalMods);
    }

    #[test]
    fn test_promotion_keeps_registration_order() {
        let mut table = RegistryTable::default();
        table.register(entry(0, "a"), Tier::VanillaOnly).unwrap();
        table.register(entry(1, "b"), Tier::WithVirtual).unwrap();
        table.register(entry(2, "c"), Tier::WithVirtual).unwrap();
        assert_eq!(
            table.register(entry(0, "a"), Tier::WithVirtual).unwrap(),
            Registration::Updated
        );

        let order: Vec<_> = table.synchronizable_entries().map(|e| e.raw_id()).collect();
        assert_eq!(order, [0, 1, 2]);
    }

    #[test]
    fn test_raw_id_conflicts() {
        let mut table = RegistryTable::default();
        table.register(entry(1, "a"), Tier::WithVirtual).unwrap();
        assert!(matches!(
            table.register(entry(1, "b"), Tier::WithVirtual),
            Err(RegistryError::RawIdTaken { raw_id: 1, .. })
        ));
        assert!(matches!(
            table.register(entry(2, "a"), Tier::WithVirtual),
            Err(RegistryError::RawIdChanged { old: 1, new: 2, .. })
        ));
    }

    #[test]
    fn test_visibility_requires_membership() {
        let client = ClientProfile::new(
            mirage_net::ClientId(1),
            "alice",
            mirage_net::ClientCapabilities::none(),
        );
        let mut table = RegistryTable::default();
        table.register(entry(0, "vanilla"), Tier::VanillaOnly).unwrap();
        table
            .register(entry(1, "hidden").with_visibility(|_| false), Tier::WithVirtual)
            .unwrap();
        table.register(entry(2, "shown"), Tier::WithVirtual).unwrap();

        assert!(!table.is_visible(0, &client));
        assert!(!table.is_visible(1, &client));
        assert!(table.is_visible(2, &client));
        assert!(!table.is_visible(99, &client));
    }

    #[test]
    fn test_tags_resolve_known_members() {
        let mut table = RegistryTable::default();
        table.register(entry(4, "a"), Tier::VanillaOnly).unwrap();
        table.register(entry(7, "b"), Tier::WithVirtual).unwrap();
        table.register_tag(id("mixed"), vec![id("b"), id("missing"), id("a")]);

        let tags: Vec<_> = table.resolved_tags().collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].1, vec![7, 4]);

        table.register_tag(id("mixed"), vec![id("a")]);
        let tags: Vec<_> = table.resolved_tags().collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].1, vec![4]);
    }
}
