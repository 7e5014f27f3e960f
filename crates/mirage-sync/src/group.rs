//! Item group (creative category) lifecycle: remove, define, set contents.

use mirage_net::payload::{Empty, GroupContents, GroupDefine, GroupId, ItemRef};
use mirage_net::{ClientProfile, Identifier, PacketKind};
use mirage_registry::RegistrySnapshot;

use crate::connection::ClientConnection;
use crate::hooks::BooleanEvent;

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Localizable display text: a translation key plus the text shown when no
/// translation is available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    /// Translation key, if any.
    pub key: Option<String>,
    /// Untranslated text.
    pub fallback: String,
}

impl Text {
    /// Text with no translation key.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            key: None,
            fallback: text.into(),
        }
    }

    /// Text resolved through a translation key.
    pub fn translatable(key: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            fallback: fallback.into(),
        }
    }
}

/// Resolves display text for a specific client.
pub trait Localizer: Send + Sync {
    /// Text in the client's language.
    fn localize(&self, text: &Text, client: &ClientProfile) -> String;
}

/// Always returns the fallback text.
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackLocalizer;

impl Localizer for FallbackLocalizer {
    fn localize(&self, text: &Text, _client: &ClientProfile) -> String {
        text.fallback.clone()
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Failure while computing a group's contents for one client.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The group's content source failed.
    #[error("contents of group {group} unavailable: {reason}")]
    Unavailable {
        /// Group whose contents failed.
        group: Identifier,
        /// Human-readable cause.
        reason: String,
    },
}

/// A client-visible grouping of items, owned by the domain layer.
pub trait ItemGroup: Send + Sync {
    /// Group identifier.
    fn id(&self) -> &Identifier;

    /// Display name.
    fn display_name(&self) -> &Text;

    /// Icon item.
    fn icon(&self) -> &ItemRef;

    /// Returns `true` if the group does not exist on a baseline client.
    fn is_virtual(&self) -> bool;

    /// Current contents for `client`, before visibility filtering.
    fn contents(&self, client: &ClientProfile) -> Result<Vec<ItemRef>, ContentError>;
}

/// Group with a fixed content list.
#[derive(Clone, Debug)]
pub struct GroupDescriptor {
    id: Identifier,
    display_name: Text,
    icon: ItemRef,
    is_virtual: bool,
    contents: Vec<ItemRef>,
}

impl GroupDescriptor {
    /// A virtual group with no contents.
    pub fn new(id: Identifier, display_name: Text, icon: ItemRef) -> Self {
        Self {
            id,
            display_name,
            icon,
            is_virtual: true,
            contents: Vec::new(),
        }
    }

    /// Marks the group as one the baseline client already has.
    pub fn baseline(mut self) -> Self {
        self.is_virtual = false;
        self
    }

    /// Replaces the content list.
    pub fn with_contents(mut self, contents: Vec<ItemRef>) -> Self {
        self.contents = contents;
        self
    }
}

impl ItemGroup for GroupDescriptor {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn display_name(&self) -> &Text {
        &self.display_name
    }

    fn icon(&self) -> &ItemRef {
        &self.icon
    }

    fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    fn contents(&self, _client: &ClientProfile) -> Result<Vec<ItemRef>, ContentError> {
        Ok(self.contents.clone())
    }
}

// ---------------------------------------------------------------------------
// GroupSyncController
// ---------------------------------------------------------------------------

/// Sends the group lifecycle packets for one registry snapshot.
pub struct GroupSyncController<'a> {
    snapshot: &'a RegistrySnapshot,
    localizer: &'a dyn Localizer,
    force_resync: bool,
    force_hook: Option<&'a BooleanEvent>,
}

impl<'a> GroupSyncController<'a> {
    /// `force_resync` is the process-wide flag that also re-defines baseline
    /// groups.
    pub fn new(
        snapshot: &'a RegistrySnapshot,
        localizer: &'a dyn Localizer,
        force_resync: bool,
    ) -> Self {
        Self {
            snapshot,
            localizer,
            force_resync,
            force_hook: None,
        }
    }

    /// Consults `hook` as well when deciding whether to resync a baseline
    /// group.
    pub fn with_force_hook(mut self, hook: &'a BooleanEvent) -> Self {
        self.force_hook = Some(hook);
        self
    }

    fn forced(&self, group: &dyn ItemGroup, client: &ClientProfile) -> bool {
        self.force_resync || self.force_hook.is_some_and(|hook| hook.any(group, client))
    }

    /// Tells the client to drop `group`. Never sent for baseline groups.
    pub fn remove(&self, conn: &mut ClientConnection<'_>, group: &dyn ItemGroup) -> bool {
        if !group.is_virtual() {
            return false;
        }
        let payload = GroupId {
            id: group.id().clone(),
        };
        conn.send_negotiated(PacketKind::GroupRemove, &payload)
    }

    /// Sends id, localized name and icon of `group`.
    pub fn define(&self, conn: &mut ClientConnection<'_>, group: &dyn ItemGroup) -> bool {
        let client = conn.profile();
        if !group.is_virtual() && !self.forced(group, client) {
            return false;
        }
        let Some(version) = conn.negotiate(PacketKind::GroupDefine) else {
            return false;
        };
        let payload = GroupDefine {
            id: group.id().clone(),
            display_name: self.localizer.localize(group.display_name(), client),
            icon: group.icon().clone(),
        };
        conn.send(PacketKind::GroupDefine, version, &payload)
    }

    /// Clears the client's contents for `group`, then adds the visible
    /// contents in one packet if there are any.
    ///
    /// Content failures are logged and abandon this group only.
    pub fn set_contents(&self, conn: &mut ClientConnection<'_>, group: &dyn ItemGroup) {
        let (Some(clear), Some(add)) = (
            conn.negotiate(PacketKind::GroupContentsClear),
            conn.negotiate(PacketKind::GroupContentsAdd),
        ) else {
            return;
        };

        let id = GroupId {
            id: group.id().clone(),
        };
        conn.send(PacketKind::GroupContentsClear, clear, &id);

        let client = conn.profile();
        let items = match group.contents(client) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!(group = %group.id(), client = %client.name, "skipping group contents: {e}");
                return;
            }
        };
        let items: Vec<ItemRef> = items
            .into_iter()
            .filter(|item| self.snapshot.item_visible(&item.item, client))
            .collect();
        if items.is_empty() {
            return;
        }

        let payload = GroupContents { id: id.id, items };
        conn.send(PacketKind::GroupContentsAdd, add, &payload);
    }

    /// Remove and define (virtual or forced groups only), then contents.
    pub fn sync(&self, conn: &mut ClientConnection<'_>, group: &dyn ItemGroup) {
        if group.is_virtual() || self.forced(group, conn.profile()) {
            self.remove(conn, group);
            self.define(conn, group);
        }
        self.set_contents(conn, group);
    }

    /// Tells the client to rebuild its group UI.
    pub fn apply_update(&self, conn: &mut ClientConnection<'_>) -> bool {
        conn.send_negotiated(PacketKind::GroupApplyUpdate, &Empty)
    }
}
