//! Client synchronization core.
//!
//! A [`SyncOrchestrator`] drives one client's sync sequence through a fixed
//! stage order. Registry tables go out through the [`BatchEncoder`], world
//! changes through the [`DeltaEncoder`], and item groups through the
//! [`GroupSyncController`]. Every emission is gated on the packet kind's
//! negotiated version; unsupported kinds are silently skipped.

pub mod batch;
pub mod connection;
pub mod delta;
pub mod group;
pub mod hooks;
pub mod orchestrator;
pub mod session;

pub use batch::{BatchEncoder, MAX_BATCH_ENTRIES};
pub use connection::ClientConnection;
pub use delta::DeltaEncoder;
pub use group::{
    ContentError, FallbackLocalizer, GroupDescriptor, GroupSyncController, ItemGroup, Localizer,
    Text,
};
pub use hooks::{BooleanEvent, Event, GroupPredicate, SyncEvent, SyncHooks, SyncListener};
pub use orchestrator::{SyncOrchestrator, SyncReport};
pub use session::SyncSession;
