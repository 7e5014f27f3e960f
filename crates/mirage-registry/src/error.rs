//! Registry error types.

use mirage_net::Identifier;

/// Structural registration errors.
///
/// Tier downgrades are not errors; they are reported as
/// [`crate::Registration::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The raw id already belongs to a different identifier.
    #[error("raw id {raw_id} is already taken by {owner}")]
    RawIdTaken {
        /// Conflicting raw id.
        raw_id: u32,
        /// Identifier currently holding it.
        owner: Identifier,
    },
    /// An update tried to move an identifier to another raw id.
    #[error("{id} cannot move from raw id {old} to {new}")]
    RawIdChanged {
        /// Identifier being updated.
        id: Identifier,
        /// Stored raw id.
        old: u32,
        /// Proposed raw id.
        new: u32,
    },
}
