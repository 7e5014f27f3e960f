//! Tiered identifier registries shared by every client session.
//!
//! Each logical registry (items, blocks, block states, ...) keeps its full
//! entry table plus the derived subset of synchronizable (non-vanilla)
//! entries. Tiers only ever go up; see [`Tier::can_replace`].

pub mod entry;
pub mod error;
pub mod kind;
pub mod table;
pub mod tier;
pub mod tracker;

pub use entry::{EntryData, RegistryEntry, VisibilityFn};
pub use error::RegistryError;
pub use kind::RegistryKind;
pub use table::{Registration, RegistryTable};
pub use tier::Tier;
pub use tracker::{RegistryBuilder, RegistrySnapshot, RegistryTracker};
