//! Demo host: builds a small registry with virtual content, syncs it to an
//! in-memory client, and streams a second client's packets through the
//! framed writer.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p mirage-demo -- --debug-validate-states true`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mirage_config::{CliArgs, Config, default_config_dir};
use mirage_net::payload::ItemRef;
use mirage_net::{
    ClientCapabilities, ClientId, ClientProfile, FrameConfig, Identifier, IdentifierError, Packet,
    PacketKind, ProtocolVersion, QueueSink, read_packet, run_writer,
};
use mirage_registry::{EntryData, RegistryBuilder, RegistryEntry, RegistryKind, RegistryTracker, Tier};
use mirage_sync::{DeltaEncoder, GroupDescriptor, SyncOrchestrator, Text};
use mirage_world::{BlockPos, Chunk, ChunkPos};
use tracing::{info, warn};

const RUBY_ORE_STATE: u32 = 4000;
const STONE_STATE: u32 = 1;

/// Baseline content plus a handful of virtual items, blocks and states.
fn build_registry() -> Result<RegistryTracker, Box<dyn std::error::Error>> {
    let mut builder = RegistryBuilder::new();
    let vanilla = |path: &str| -> Result<Identifier, IdentifierError> { Identifier::vanilla(path) };
    let demo = |path: &str| -> Result<Identifier, IdentifierError> { Identifier::new("demo", path) };

    builder.register(RegistryKind::Item, RegistryEntry::new(0, vanilla("stone")?), Tier::VanillaOnly)?;
    for (n, gem) in ["ruby", "sapphire", "topaz"].into_iter().enumerate() {
        let entry = RegistryEntry::new(1000 + n as u32, demo(gem)?).with_data(EntryData::Item {
            client_item: vanilla("emerald")?,
        });
        builder.register(RegistryKind::Item, entry, Tier::WithVirtual)?;
    }

    builder.register(RegistryKind::Block, RegistryEntry::new(1, vanilla("stone")?), Tier::VanillaOnly)?;
    builder.register(
        RegistryKind::Block,
        RegistryEntry::new(500, demo("ruby_ore")?).with_data(EntryData::Block {
            name: "Ruby Ore".into(),
        }),
        Tier::WithVirtual,
    )?;

    builder.register(
        RegistryKind::BlockState,
        RegistryEntry::new(STONE_STATE, vanilla("stone")?),
        Tier::VanillaOnly,
    )?;
    builder.register(
        RegistryKind::BlockState,
        RegistryEntry::new(RUBY_ORE_STATE, demo("ruby_ore")?).with_data(EntryData::BlockState {
            block: demo("ruby_ore")?,
            properties: Vec::new(),
        }),
        Tier::WithVirtual,
    )?;

    builder.register(RegistryKind::Fluid, RegistryEntry::new(0, vanilla("empty")?), Tier::VanillaOnly)?;
    builder.register(RegistryKind::Fluid, RegistryEntry::new(1, vanilla("water")?), Tier::VanillaOnly)?;

    builder.register_tag(
        RegistryKind::Item,
        demo("gems")?,
        vec![demo("ruby")?, demo("sapphire")?, demo("topaz")?],
    );

    Ok(builder.build())
}

/// Counts packets per kind, in first-seen stage order.
fn summarize(packets: &[Packet]) -> Vec<(PacketKind, usize)> {
    let mut order = Vec::new();
    let mut counts = BTreeMap::new();
    for packet in packets {
        let count = counts.entry(packet.kind.wire_id()).or_insert(0);
        if *count == 0 {
            order.push(packet.kind);
        }
        *count += 1;
    }
    order
        .into_iter()
        .map(|kind| (kind, counts[&kind.wire_id()]))
        .collect()
}

fn demonstrate_full_sync(orchestrator: &SyncOrchestrator, client: &ClientProfile) {
    let mut sink: Vec<Packet> = Vec::new();
    let Some(report) = orchestrator.sync(client, &mut sink, true) else {
        warn!("{} does not support registry sync", client.name);
        return;
    };
    info!(
        "Full sync for {}: {} packets, {} bytes",
        client.name,
        report.packets,
        sink.iter().map(|p| p.payload.len()).sum::<usize>()
    );
    for (kind, count) in summarize(&sink) {
        info!("  {:<28} x{}", kind.channel(), count);
    }
}

fn demonstrate_world_deltas(orchestrator: &SyncOrchestrator, client: &ClientProfile) {
    let tracker = orchestrator.tracker();
    let snapshot = tracker.snapshot();
    let mut chunk = Chunk::new(ChunkPos { x: 0, z: -1 }, -4, 24);
    for (pos, state) in [
        (BlockPos::new(10, 64, -3), RUBY_ORE_STATE),
        (BlockPos::new(11, 64, -3), STONE_STATE),
        (BlockPos::new(2, -20, -9), RUBY_ORE_STATE),
    ] {
        let synchronizable = tracker.is_synchronizable(RegistryKind::BlockState, state);
        if let Err(e) = chunk.set_block(pos, state, synchronizable) {
            warn!("skipping block at {pos:?}: {e}");
        }
    }

    let mut sink: Vec<Packet> = Vec::new();
    let mut conn = orchestrator.connect(client, &mut sink);
    let delta = DeltaEncoder::new(&snapshot);
    delta.single_block_update(&mut conn, BlockPos::new(10, 64, -3), RUBY_ORE_STATE);
    delta.single_block_update(&mut conn, BlockPos::new(11, 64, -3), STONE_STATE);
    let sections = delta.full_section_resync(&mut conn, &chunk);
    info!(
        "World deltas for {}: {} packets ({} section resyncs)",
        client.name,
        conn.sent(),
        sections
    );
}

async fn demonstrate_framed_stream(orchestrator: &SyncOrchestrator, client: &ClientProfile, config: &Config) {
    let frame = FrameConfig {
        max_payload_size: config.network.max_payload_size,
    };
    let (writer_end, mut reader_end) = tokio::io::duplex(64 * 1024);
    let (mut sink, rx) = QueueSink::new();
    let writer = tokio::spawn(run_writer(rx, writer_end, frame.clone()));

    let expected = orchestrator
        .sync(client, &mut sink, true)
        .map_or(0, |report| report.packets);
    drop(sink);

    let mut received = 0;
    for _ in 0..expected {
        match read_packet(&mut reader_end, &frame).await {
            Ok(_) => received += 1,
            Err(e) => {
                warn!("framed read failed: {e}");
                break;
            }
        }
    }
    match writer.await {
        Ok(Ok(written)) => info!("Framed stream for {}: wrote {written}, read {received}", client.name),
        Ok(Err(e)) => warn!("writer task failed: {e}"),
        Err(e) => warn!("writer task panicked: {e}"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(|| default_config_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    mirage_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let tracker = match build_registry() {
        Ok(tracker) => Arc::new(tracker),
        Err(e) => {
            eprintln!("Failed to build registry: {e}");
            return;
        }
    };

    let mut orchestrator = SyncOrchestrator::new(tracker, config.sync.clone());
    if let (Ok(id), Ok(icon)) = (Identifier::new("demo", "gems"), Identifier::new("demo", "ruby")) {
        let contents = ["ruby", "sapphire", "topaz"]
            .into_iter()
            .filter_map(|path| Identifier::new("demo", path).ok())
            .map(ItemRef::single)
            .collect();
        orchestrator.add_group(Arc::new(
            GroupDescriptor::new(id, Text::translatable("itemGroup.demo.gems", "Gems"), ItemRef::single(icon))
                .with_contents(contents),
        ));
    }
    orchestrator.hooks_mut().custom.register(|conn, session| {
        tracing::debug!(client = %conn.profile().name, full = session.is_full(), "custom sync stage");
    });

    let modded = ClientProfile::new(ClientId(1), "modded", ClientCapabilities::all(ProtocolVersion(0)));
    let vanilla = ClientProfile::new(ClientId(2), "vanilla", ClientCapabilities::none());

    demonstrate_full_sync(&orchestrator, &modded);
    demonstrate_full_sync(&orchestrator, &vanilla);
    demonstrate_world_deltas(&orchestrator, &modded);
    demonstrate_framed_stream(&orchestrator, &modded, &config).await;
}
