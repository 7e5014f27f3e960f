//! Ordered listener lists invoked between sync stages.
//!
//! Two dispatch shapes exist: [`SyncEvent`] fires every listener and ignores
//! results; [`BooleanEvent`] stops at the first listener returning `true`.
//! Listeners run in registration order.

use std::fmt;

use mirage_net::ClientProfile;

use crate::connection::ClientConnection;
use crate::group::ItemGroup;
use crate::session::SyncSession;

/// Stage listener. May send its own packets through the connection.
pub type SyncListener = dyn Fn(&mut ClientConnection<'_>, &SyncSession) + Send + Sync;

/// Per-group, per-client predicate.
pub type GroupPredicate = dyn Fn(&dyn ItemGroup, &ClientProfile) -> bool + Send + Sync;

/// An ordered list of listeners of type `L`.
pub struct Event<L: ?Sized> {
    listeners: Vec<Box<L>>,
}

/// Fire-all stage hook.
pub type SyncEvent = Event<SyncListener>;

/// Short-circuiting boolean hook.
pub type BooleanEvent = Event<GroupPredicate>;

impl<L: ?Sized> Event<L> {
    /// An event with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<L: ?Sized> Default for Event<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Event<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Event<SyncListener> {
    /// Appends a listener.
    pub fn register(
        &mut self,
        listener: impl Fn(&mut ClientConnection<'_>, &SyncSession) + Send + Sync + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    /// Calls every listener in order.
    pub fn invoke(&self, conn: &mut ClientConnection<'_>, session: &SyncSession) {
        for listener in &self.listeners {
            listener(conn, session);
        }
    }
}

impl Event<GroupPredicate> {
    /// Appends a predicate.
    pub fn register(
        &mut self,
        predicate: impl Fn(&dyn ItemGroup, &ClientProfile) -> bool + Send + Sync + 'static,
    ) {
        self.listeners.push(Box::new(predicate));
    }

    /// Returns `true` at the first predicate that does; later ones are not
    /// called.
    pub fn any(&self, group: &dyn ItemGroup, client: &ClientProfile) -> bool {
        self.listeners.iter().any(|predicate| predicate(group, client))
    }
}

/// Every extension point of the sync sequence.
#[derive(Debug, Default)]
pub struct SyncHooks {
    /// Right after the Started packet.
    pub started: SyncEvent,
    pub before_items: SyncEvent,
    pub after_items: SyncEvent,
    /// Full syncs only.
    pub before_groups: SyncEvent,
    /// Full syncs only.
    pub after_groups: SyncEvent,
    pub before_blocks: SyncEvent,
    pub after_blocks: SyncEvent,
    pub before_block_states: SyncEvent,
    pub after_block_states: SyncEvent,
    pub before_entities: SyncEvent,
    pub after_entities: SyncEvent,
    /// After the last registry stage.
    pub custom: SyncEvent,
    /// Right before the Finished packet.
    pub finished: SyncEvent,
    /// Forces remove/define of non-virtual groups for specific clients.
    pub force_group_resync: BooleanEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use mirage_net::{ClientCapabilities, ClientId, Identifier, Packet, ServerCapabilities};
    use mirage_net::payload::ItemRef;

    use crate::group::{GroupDescriptor, Text};

    fn client() -> ClientProfile {
        ClientProfile::new(ClientId(1), "alice", ClientCapabilities::none())
    }

    #[test]
    fn test_sync_event_runs_in_order() {
        let log = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut event = SyncEvent::new();
        for i in 0..3 {
            let log = Arc::clone(&log);
            event.register(move |_, _| log.lock().unwrap().push(i));
        }

        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        event.invoke(&mut conn, &SyncSession::new(true));

        assert_eq!(*log.lock().unwrap(), [0, 1, 2]);
    }

    #[test]
    fn test_empty_event_is_harmless() {
        let event = SyncEvent::default();
        let client = client();
        let server = ServerCapabilities::default();
        let mut sink: Vec<Packet> = Vec::new();
        let mut conn = ClientConnection::new(&client, &server, &mut sink);
        event.invoke(&mut conn, &SyncSession::new(false));
        assert!(event.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_boolean_event_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut event = BooleanEvent::new();
        for answer in [false, true, false] {
            let calls = Arc::clone(&calls);
            event.register(move |_, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                answer
            });
        }

        let id = Identifier::new("test", "tools").unwrap();
        let group = GroupDescriptor::new(id.clone(), Text::literal("Tools"), ItemRef::single(id));
        assert!(event.any(&group, &client()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
