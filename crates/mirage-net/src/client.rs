//! Identity and capabilities of a connected client.

use crate::capability::ClientCapabilities;

/// Unique identifier for a client connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

/// Everything the sync core knows about a connected client.
///
/// Populated by the transport during the handshake; read-only afterwards.
/// Visibility predicates of domain objects receive this to decide whether an
/// entry may be revealed to the client.
#[derive(Clone, Debug)]
pub struct ClientProfile {
    /// Connection identifier.
    pub id: ClientId,
    /// Display name, used in diagnostics.
    pub name: String,
    /// Client language code (e.g. `en_us`).
    pub language: String,
    /// Packet kinds and versions the client advertised.
    pub capabilities: ClientCapabilities,
}

impl ClientProfile {
    /// Creates a profile with the default `en_us` language.
    pub fn new(id: ClientId, name: impl Into<String>, capabilities: ClientCapabilities) -> Self {
        Self {
            id,
            name: name.into(),
            language: "en_us".to_string(),
            capabilities,
        }
    }
}
