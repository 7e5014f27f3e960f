//! The staged sync sequence for one client.
//!
//! Stage order, with every stage skipped when its packet kind does not
//! negotiate:
//!
//! ```text
//! Started -> Clear -> Info -> Enchantments -> Items -> [Groups] -> Blocks
//!   -> BlockStates -> Entities -> VillagerProfessions -> StatusEffects
//!   -> BlockEntityTypes -> Fluids -> [Tags] -> custom hook -> Finished
//! ```
//!
//! Bracketed stages run on full syncs only. Hooks fire around the item,
//! group, block, block-state and entity stages whether or not the stage
//! itself was sent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mirage_config::SyncConfig;
use mirage_net::payload::{
    BlockEntry, BlockStateEntry, DebugStateEntry, Empty, EntityEntry, IdValueEntry, ItemEntry,
    SyncInfo, TagEntry, TagPayload,
};
use mirage_net::{ClientProfile, PacketKind, PacketSink, ServerCapabilities};
use mirage_registry::{EntryData, RegistryEntry, RegistryKind, RegistrySnapshot, RegistryTracker};
use serde::Serialize;

use crate::batch::{BatchEncoder, encode_batches};
use crate::connection::ClientConnection;
use crate::group::{FallbackLocalizer, GroupSyncController, ItemGroup, Localizer};
use crate::hooks::SyncHooks;
use crate::session::SyncSession;

/// Outcome of one sync sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncReport {
    /// Whether this was a full sync.
    pub full_sync: bool,
    /// Packets handed to the client's sink.
    pub packets: usize,
    /// Wall time of the sequence.
    pub elapsed: Duration,
}

/// Runs sync sequences against a shared [`RegistryTracker`].
///
/// One orchestrator serves every client; each [`SyncOrchestrator::sync`]
/// call pins a registry snapshot for its whole sequence.
pub struct SyncOrchestrator {
    tracker: Arc<RegistryTracker>,
    server: ServerCapabilities,
    config: SyncConfig,
    hooks: SyncHooks,
    groups: Vec<Arc<dyn ItemGroup>>,
    localizer: Box<dyn Localizer>,
}

impl SyncOrchestrator {
    /// Creates an orchestrator supporting every packet kind at version 0.
    pub fn new(tracker: Arc<RegistryTracker>, config: SyncConfig) -> Self {
        Self {
            tracker,
            server: ServerCapabilities::default(),
            config,
            hooks: SyncHooks::default(),
            groups: Vec::new(),
            localizer: Box::new(FallbackLocalizer),
        }
    }

    /// Replaces the server's capability table.
    pub fn with_server_capabilities(mut self, server: ServerCapabilities) -> Self {
        self.server = server;
        self
    }

    /// Replaces the localizer used for group names.
    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    /// Extension points, for registering listeners.
    pub fn hooks_mut(&mut self) -> &mut SyncHooks {
        &mut self.hooks
    }

    /// Adds an item group to the Groups stage.
    pub fn add_group(&mut self, group: Arc<dyn ItemGroup>) {
        self.groups.push(group);
    }

    /// Shared registry tracker.
    pub fn tracker(&self) -> &Arc<RegistryTracker> {
        &self.tracker
    }

    /// Server capability table.
    pub fn server_capabilities(&self) -> &ServerCapabilities {
        &self.server
    }

    /// Wraps `client` for standalone operations such as world deltas.
    pub fn connect<'a>(
        &'a self,
        client: &'a ClientProfile,
        sink: &'a mut dyn PacketSink,
    ) -> ClientConnection<'a> {
        ClientConnection::new(client, &self.server, sink)
    }

    /// Runs the full or partial sync sequence for `client`.
    ///
    /// Returns `None` without sending anything if the client does not
    /// support sync at all.
    pub fn sync(
        &self,
        client: &ClientProfile,
        sink: &mut dyn PacketSink,
        full_sync: bool,
    ) -> Option<SyncReport> {
        let mut conn = self.connect(client, sink);
        let Some(version) = conn.negotiate(PacketKind::SyncStarted) else {
            tracing::debug!(client = %client.name, "client does not support registry sync");
            return None;
        };

        let session = SyncSession::new(full_sync);
        let snapshot = self.tracker.snapshot();
        let batch = BatchEncoder::new(&snapshot);
        let hooks = &self.hooks;
        let conn = &mut conn;

        conn.send(PacketKind::SyncStarted, version, &Empty);
        hooks.started.invoke(conn, &session);

        conn.send_negotiated(PacketKind::SyncClear, &Empty);
        conn.send_negotiated(
            PacketKind::SyncInfo,
            &SyncInfo {
                block_state_offset: snapshot.block_state_offset(),
            },
        );

        sync_table(conn, &batch, &snapshot, RegistryKind::Enchantment, id_value);

        hooks.before_items.invoke(conn, &session);
        sync_table(conn, &batch, &snapshot, RegistryKind::Item, item_entry);
        hooks.after_items.invoke(conn, &session);

        if full_sync {
            hooks.before_groups.invoke(conn, &session);
            self.sync_groups(conn, &snapshot);
            hooks.after_groups.invoke(conn, &session);
        }

        hooks.before_blocks.invoke(conn, &session);
        sync_table(conn, &batch, &snapshot, RegistryKind::Block, block_entry);
        hooks.after_blocks.invoke(conn, &session);

        hooks.before_block_states.invoke(conn, &session);
        sync_table(conn, &batch, &snapshot, RegistryKind::BlockState, |entry| {
            block_state_entry(&snapshot, entry)
        });
        hooks.after_block_states.invoke(conn, &session);

        hooks.before_entities.invoke(conn, &session);
        sync_table(conn, &batch, &snapshot, RegistryKind::EntityType, entity_entry);
        hooks.after_entities.invoke(conn, &session);

        for registry in [
            RegistryKind::VillagerProfession,
            RegistryKind::StatusEffect,
            RegistryKind::BlockEntityType,
            RegistryKind::Fluid,
        ] {
            let table = snapshot.table(registry);
            batch.encode(conn, packet_kind(registry), registry, table.entries(), true, id_value);
        }

        if full_sync {
            encode_batches(conn, PacketKind::SyncTags, RegistryKind::ALL, |registry| {
                tag_entry(&snapshot, registry)
            });
        }

        hooks.custom.invoke(conn, &session);

        if full_sync && self.config.debug_validate_states {
            debug_validate_states(conn, &snapshot);
        }

        hooks.finished.invoke(conn, &session);
        conn.send(PacketKind::SyncFinished, version, &Empty);

        let elapsed = session.elapsed();
        if self.config.log_sync_time {
            tracing::info!(
                "{} sync for {} took {} ms",
                if full_sync { "Full" } else { "Partial" },
                client.name,
                format_millis(elapsed)
            );
        }

        Some(SyncReport {
            full_sync,
            packets: conn.sent(),
            elapsed,
        })
    }

    /// Sends the unfiltered block-state table so the client can check its
    /// mapping. Returns the number of packets sent.
    pub fn send_debug_validate_states(
        &self,
        client: &ClientProfile,
        sink: &mut dyn PacketSink,
    ) -> usize {
        let snapshot = self.tracker.snapshot();
        let mut conn = self.connect(client, sink);
        debug_validate_states(&mut conn, &snapshot)
    }

    fn sync_groups(&self, conn: &mut ClientConnection<'_>, snapshot: &RegistrySnapshot) {
        if !conn.supports(PacketKind::GroupDefine) {
            tracing::debug!(client = %conn.profile().name, "skipping item groups");
            return;
        }
        let controller =
            GroupSyncController::new(snapshot, &*self.localizer, self.config.force_group_resync)
                .with_force_hook(&self.hooks.force_group_resync);
        for group in &self.groups {
            controller.sync(conn, group.as_ref());
        }
        controller.apply_update(conn);
    }
}

impl fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .field("groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Packet kind carrying the table of `registry`.
pub fn packet_kind(registry: RegistryKind) -> PacketKind {
    match registry {
        RegistryKind::Enchantment => PacketKind::SyncEnchantment,
        RegistryKind::Item => PacketKind::SyncItem,
        RegistryKind::Block => PacketKind::SyncBlock,
        RegistryKind::BlockState => PacketKind::SyncBlockState,
        RegistryKind::EntityType => PacketKind::SyncEntity,
        RegistryKind::VillagerProfession => PacketKind::SyncVillagerProfession,
        RegistryKind::StatusEffect => PacketKind::SyncStatusEffect,
        RegistryKind::BlockEntityType => PacketKind::SyncBlockEntity,
        RegistryKind::Fluid => PacketKind::SyncFluid,
    }
}

/// Filtered sync of the synchronizable entries of `registry`.
fn sync_table<T, F>(
    conn: &mut ClientConnection<'_>,
    batch: &BatchEncoder<'_>,
    snapshot: &RegistrySnapshot,
    registry: RegistryKind,
    serialize: F,
) -> usize
where
    T: Serialize,
    F: FnMut(&RegistryEntry) -> Option<T>,
{
    let entries = snapshot.synchronizable_entries(registry);
    batch.encode(conn, packet_kind(registry), registry, entries, false, serialize)
}

/// Every registered state, baseline included. States without block data
/// name themselves as their block.
fn debug_validate_states(conn: &mut ClientConnection<'_>, snapshot: &RegistrySnapshot) -> usize {
    let entries = snapshot.table(RegistryKind::BlockState).entries();
    encode_batches(conn, PacketKind::DebugValidateStates, entries, |entry| {
        let (block, properties) = match entry.data() {
            EntryData::BlockState { block, properties } => {
                (block.clone(), sorted_properties(properties))
            }
            _ => (entry.id().clone(), Vec::new()),
        };
        Some(DebugStateEntry {
            raw_state_id: entry.raw_id(),
            block,
            properties,
        })
    })
}

// ---------------------------------------------------------------------------
// Record serializers
// ---------------------------------------------------------------------------

fn id_value(entry: &RegistryEntry) -> Option<IdValueEntry> {
    Some(IdValueEntry {
        raw_id: entry.raw_id(),
        id: entry.id().clone(),
    })
}

fn item_entry(entry: &RegistryEntry) -> Option<ItemEntry> {
    let EntryData::Item { client_item } = entry.data() else {
        return None;
    };
    Some(ItemEntry {
        raw_id: entry.raw_id(),
        id: entry.id().clone(),
        client_item: client_item.clone(),
    })
}

fn display_name(entry: &RegistryEntry) -> String {
    match entry.data() {
        EntryData::Block { name } | EntryData::Entity { name } => name.clone(),
        _ => entry.id().to_string(),
    }
}

fn block_entry(entry: &RegistryEntry) -> Option<BlockEntry> {
    Some(BlockEntry {
        raw_id: entry.raw_id(),
        id: entry.id().clone(),
        name: display_name(entry),
    })
}

fn entity_entry(entry: &RegistryEntry) -> Option<EntityEntry> {
    Some(EntityEntry {
        raw_id: entry.raw_id(),
        id: entry.id().clone(),
        name: display_name(entry),
    })
}

/// States whose block is not registered have no valid mapping and are
/// skipped.
fn block_state_entry(snapshot: &RegistrySnapshot, entry: &RegistryEntry) -> Option<BlockStateEntry> {
    let EntryData::BlockState { block, properties } = entry.data() else {
        return None;
    };
    let block = snapshot.table(RegistryKind::Block).get(block)?;
    Some(BlockStateEntry {
        raw_state_id: entry.raw_id(),
        block_raw_id: block.raw_id(),
        properties: sorted_properties(properties),
    })
}

/// Milliseconds with two decimals.
fn format_millis(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64() * 1000.0)
}

fn sorted_properties(properties: &[(String, String)]) -> Vec<(String, String)> {
    let mut sorted = properties.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}

fn tag_entry(snapshot: &RegistrySnapshot, registry: RegistryKind) -> Option<TagEntry> {
    let table = snapshot.table(registry);
    if !table.has_tags() {
        return None;
    }
    let tags = table
        .resolved_tags()
        .map(|(id, members)| TagPayload {
            id: id.clone(),
            members,
        })
        .collect();
    Some(TagEntry {
        registry: registry.identifier().ok()?,
        tags,
    })
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
