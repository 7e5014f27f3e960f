//! Process-wide registry tracker with atomic snapshot publication.
//!
//! # Lifecycle
//!
//! 1. Startup: entries are registered through a [`RegistryBuilder`] (plain
//!    `&mut` access, no synchronization cost) and frozen with
//!    [`RegistryBuilder::build`].
//! 2. Sessions: every client context reads through
//!    [`RegistryTracker::snapshot`], which pins an immutable
//!    [`RegistrySnapshot`] for the whole sync sequence.
//! 3. Late registration: [`RegistryTracker::register`] builds a replacement
//!    snapshot and publishes it atomically. Readers holding an older snapshot
//!    keep seeing the pre-update state; a single traversal never mixes the two.
//!
//! Writers are serialized by a mutex; readers never take it.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use mirage_net::{ClientProfile, Identifier};

use crate::entry::RegistryEntry;
use crate::error::RegistryError;
use crate::kind::RegistryKind;
use crate::table::{Registration, RegistryTable};
use crate::tier::Tier;

/// Immutable view of every registry at one point in time.
#[derive(Clone, Debug, Default)]
pub struct RegistrySnapshot {
    tables: [Arc<RegistryTable>; RegistryKind::COUNT],
}

impl RegistrySnapshot {
    /// The table of one registry.
    pub fn table(&self, kind: RegistryKind) -> &RegistryTable {
        &self.tables[kind.index()]
    }

    fn table_mut(&mut self, kind: RegistryKind) -> &mut RegistryTable {
        Arc::make_mut(&mut self.tables[kind.index()])
    }

    /// Synchronizable entries of `kind` in registration order.
    pub fn synchronizable_entries(
        &self,
        kind: RegistryKind,
    ) -> impl Iterator<Item = &Arc<RegistryEntry>> {
        self.table(kind).synchronizable_entries()
    }

    /// O(1) membership test in the synchronizable subset.
    pub fn is_synchronizable(&self, kind: RegistryKind, raw_id: u32) -> bool {
        self.table(kind).is_synchronizable(raw_id)
    }

    /// Membership test followed by the entry's visibility predicate.
    pub fn is_visible(&self, kind: RegistryKind, raw_id: u32, client: &ClientProfile) -> bool {
        self.table(kind).is_visible(raw_id, client)
    }

    /// Whether an item may be shown to `client`.
    ///
    /// Unknown items and baseline items are always shown; virtual items
    /// defer to their visibility predicate.
    pub fn item_visible(&self, item: &Identifier, client: &ClientProfile) -> bool {
        self.table(RegistryKind::Item)
            .get(item)
            .is_none_or(|entry| !entry.is_synchronizable() || entry.is_visible_to(client))
    }

    /// Raw id at which server-only block states begin.
    pub fn block_state_offset(&self) -> u32 {
        u32::try_from(self.table(RegistryKind::BlockState).vanilla_len()).unwrap_or(u32::MAX)
    }
}

/// Mutable registry set used before the first client session.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    snapshot: RegistrySnapshot,
}

impl RegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates an entry. See [`RegistryTracker::register`].
    pub fn register(
        &mut self,
        kind: RegistryKind,
        entry: RegistryEntry,
        tier: Tier,
    ) -> Result<Registration, RegistryError> {
        self.snapshot.table_mut(kind).register(entry, tier)
    }

    /// Declares a tag of `kind`.
    pub fn register_tag(&mut self, kind: RegistryKind, tag: Identifier, members: Vec<Identifier>) {
        self.snapshot.table_mut(kind).register_tag(tag, members);
    }

    /// Freezes the builder into a shareable tracker.
    pub fn build(self) -> RegistryTracker {
        RegistryTracker {
            current: ArcSwap::from_pointee(self.snapshot),
            write_lock: Mutex::new(()),
        }
    }
}

/// Read-mostly index over every registry, shared by all client contexts.
#[derive(Debug)]
pub struct RegistryTracker {
    current: ArcSwap<RegistrySnapshot>,
    write_lock: Mutex<()>,
}

impl RegistryTracker {
    /// An empty tracker.
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Pins the current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    /// Inserts or updates an entry and publishes the result atomically.
    ///
    /// A proposed tier ranked below the stored one is a no-op
    /// ([`Registration::Rejected`]); the stored entry is kept unchanged.
    pub fn register(
        &self,
        kind: RegistryKind,
        entry: RegistryEntry,
        tier: Tier,
    ) -> Result<Registration, RegistryError> {
        self.publish(|snapshot| snapshot.table_mut(kind).register(entry, tier))
    }

    /// Registers many entries of one kind with a single publication.
    ///
    /// Stops at the first structural error; entries before it stay published.
    pub fn register_all(
        &self,
        kind: RegistryKind,
        entries: impl IntoIterator<Item = (RegistryEntry, Tier)>,
    ) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RegistrySnapshot::clone(&self.current.load());
        let table = next.table_mut(kind);
        let mut result = Ok(());
        for (entry, tier) in entries {
            if let Err(e) = table.register(entry, tier) {
                result = Err(e);
                break;
            }
        }
        self.current.store(Arc::new(next));
        result
    }

    /// Declares a tag of `kind` and publishes it.
    pub fn register_tag(&self, kind: RegistryKind, tag: Identifier, members: Vec<Identifier>) {
        let _ = self.publish(|snapshot| {
            snapshot.table_mut(kind).register_tag(tag, members);
            Ok::<_, RegistryError>(())
        });
    }

    /// Synchronizable entries of `kind` from the current snapshot.
    pub fn synchronizable_entries(&self, kind: RegistryKind) -> Vec<Arc<RegistryEntry>> {
        self.snapshot().synchronizable_entries(kind).cloned().collect()
    }

    /// O(1) membership test against the current snapshot.
    pub fn is_synchronizable(&self, kind: RegistryKind, raw_id: u32) -> bool {
        self.current.load().is_synchronizable(kind, raw_id)
    }

    fn publish<T>(
        &self,
        update: impl FnOnce(&mut RegistrySnapshot) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = RegistrySnapshot::clone(&self.current.load());
        let out = update(&mut next)?;
        self.current.store(Arc::new(next));
        Ok(out)
    }
}

impl Default for RegistryTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirage_net::{ClientCapabilities, ClientId};
    use std::thread;

    fn id(path: &str) -> Identifier {
        Identifier::new("test", path).unwrap()
    }

    fn client() -> ClientProfile {
        ClientProfile::new(ClientId(1), "alice", ClientCapabilities::none())
    }

    #[test]
    fn test_builder_then_tracker() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(RegistryKind::Item, RegistryEntry::new(0, id("a")), Tier::VanillaOnly)
            .unwrap();
        builder
            .register(RegistryKind::Item, RegistryEntry::new(1, id("b")), Tier::WithVirtual)
            .unwrap();
        let tracker = builder.build();

        let entries = tracker.synchronizable_entries(RegistryKind::Item);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), &id("b"));
        assert!(tracker.is_synchronizable(RegistryKind::Item, 1));
        assert!(!tracker.is_synchronizable(RegistryKind::Item, 0));
        assert!(!tracker.is_synchronizable(RegistryKind::Block, 1));
    }

    #[test]
    fn test_pinned_snapshot_does_not_observe_late_registration() {
        let tracker = RegistryTracker::new();
        tracker
            .register(RegistryKind::Block, RegistryEntry::new(1, id("a")), Tier::WithVirtual)
            .unwrap();
        let before = tracker.snapshot();

        tracker
            .register(RegistryKind::Block, RegistryEntry::new(2, id("b")), Tier::WithVirtual)
            .unwrap();

        assert_eq!(before.synchronizable_entries(RegistryKind::Block).count(), 1);
        assert_eq!(
            tracker
                .snapshot()
                .synchronizable_entries(RegistryKind::Block)
                .count(),
            2
        );
    }

    #[test]
    fn test_failed_registration_publishes_nothing() {
        let tracker = RegistryTracker::new();
        tracker
            .register(RegistryKind::Item, RegistryEntry::new(1, id("a")), Tier::WithVirtual)
            .unwrap();
        let before = tracker.snapshot();
        let result =
            tracker.register(RegistryKind::Item, RegistryEntry::new(1, id("b")), Tier::WithVirtual);
        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &tracker.snapshot()));
    }

    #[test]
    fn test_register_all_single_publication() {
        let tracker = RegistryTracker::new();
        let entries = (0..10).map(|i| {
            (
                RegistryEntry::new(i, id(&format!("item_{i}"))),
                Tier::WithVirtual,
            )
        });
        tracker.register_all(RegistryKind::Item, entries).unwrap();
        let raw: Vec<_> = tracker
            .synchronizable_entries(RegistryKind::Item)
            .iter()
            .map(|e| e.raw_id())
            .collect();
        assert_eq!(raw, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_block_state_offset_counts_vanilla_states() {
        let mut builder = RegistryBuilder::new();
        for raw in 0..5 {
            builder
                .register(
                    RegistryKind::BlockState,
                    RegistryEntry::new(raw, id(&format!("s{raw}"))),
                    if raw < 3 { Tier::VanillaOnly } else { Tier::WithVirtual },
                )
                .unwrap();
        }
        assert_eq!(builder.build().snapshot().block_state_offset(), 3);
    }

    #[test]
    fn test_item_visibility() {
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                RegistryKind::Item,
                RegistryEntry::new(0, id("vanilla")).with_visibility(|_| false),
                Tier::VanillaOnly,
            )
            .unwrap();
        builder
            .register(
                RegistryKind::Item,
                RegistryEntry::new(1, id("secret")).with_visibility(|c| c.name == "bob"),
                Tier::WithVirtual,
            )
            .unwrap();
        let snapshot = builder.build().snapshot();
        let alice = client();

        assert!(snapshot.item_visible(&id("vanilla"), &alice));
        assert!(snapshot.item_visible(&id("unknown"), &alice));
        assert!(!snapshot.item_visible(&id("secret"), &alice));
    }

    #[test]
    fn test_concurrent_readers_see_whole_entries() {
        let tracker = Arc::new(RegistryTracker::new());
        let writer = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for raw in 0..200u32 {
                    let name = format!("e{raw}");
                    tracker
                        .register(
                            RegistryKind::Item,
                            RegistryEntry::new(raw, id(&name)),
                            Tier::VanillaOnly,
                        )
                        .unwrap();
                    tracker
                        .register(
                            RegistryKind::Item,
                            RegistryEntry::new(raw, id(&name)),
                            Tier::WithVirtual,
                        )
                        .unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = tracker.snapshot();
                        let table = snapshot.table(RegistryKind::Item);
                        for entry in table.synchronizable_entries() {
                            assert!(entry.is_synchronizable());
                            assert!(table.is_synchronizable(entry.raw_id()));
                        }
                        let raws: Vec<_> =
                            table.synchronizable_entries().map(|e| e.raw_id()).collect();
                        assert!(raws.windows(2).all(|w| w[0] < w[1]));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(tracker.synchronizable_entries(RegistryKind::Item).len(), 200);
    }
}
