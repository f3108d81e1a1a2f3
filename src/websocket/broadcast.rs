use std::collections::HashSet;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::messages::ServerMessage;

pub type ConnectionId = Uuid;

/// Fan-out of server messages to connected sockets.
///
/// Tracks the outbound queue of every open connection and which connections
/// are subscribed to which room. Delivery never waits. A connection whose
/// queue is full is unregistered, which closes its queue once the buffered
/// messages are written, so the client sees a closed socket instead of a
/// gap in the room's updates. The registry must hold the only sender.
#[derive(Default)]
pub struct Broadcaster {
    connections: DashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
    rooms: DashMap<String, HashSet<ConnectionId>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, tx: mpsc::Sender<ServerMessage>) {
        self.connections.insert(id, tx);
    }

    /// Forget a connection and all its room subscriptions
    pub fn unregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
        for mut members in self.rooms.iter_mut() {
            members.remove(&id);
        }
        self.rooms.retain(|_, members| !members.is_empty());
    }

    pub fn subscribe(&self, room: &str, id: ConnectionId) {
        self.rooms.entry(room.to_string()).or_default().insert(id);
    }

    /// Drop every subscription to a room that no longer exists
    pub fn close_room(&self, room: &str) {
        self.rooms.remove(room);
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn send_to(&self, id: ConnectionId, message: ServerMessage) {
        let Some(tx) = self.connections.get(&id).map(|tx| tx.clone()) else {
            tracing::debug!("Connection {} is gone, dropping {:?}", id, message);
            return;
        };
        self.deliver(id, tx, message);
    }

    pub fn send_to_room(&self, room: &str, message: &ServerMessage) {
        self.send_to_room_filtered(room, None, message);
    }

    /// Send to everyone in the room except `sender`
    pub fn send_to_room_except(&self, room: &str, sender: ConnectionId, message: &ServerMessage) {
        self.send_to_room_filtered(room, Some(sender), message);
    }

    pub fn send_to_all(&self, message: &ServerMessage) {
        let targets: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = self
            .connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        for (id, tx) in targets {
            self.deliver(id, tx, message.clone());
        }
    }

    fn send_to_room_filtered(
        &self,
        room: &str,
        skip: Option<ConnectionId>,
        message: &ServerMessage,
    ) {
        // Snapshot the member list so no map guard is held while sending
        let members: Vec<ConnectionId> = match self.rooms.get(room) {
            Some(members) => members.iter().copied().collect(),
            None => return,
        };

        for id in members.into_iter().filter(|id| Some(*id) != skip) {
            if let Some(tx) = self.connections.get(&id).map(|tx| tx.clone()) {
                self.deliver(id, tx, message.clone());
            }
        }
    }

    /// Takes the sender by value so no clone outlives an unregister
    fn deliver(&self, id: ConnectionId, tx: mpsc::Sender<ServerMessage>, message: ServerMessage) {
        match tx.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Outbound queue full for connection {}, disconnecting it", id);
                drop(tx);
                self.unregister(id);
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Connection {} closed before delivery", id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn connect(broadcaster: &Broadcaster) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(8);
        broadcaster.register(id, tx);
        (id, rx)
    }

    fn players(names: &[&str]) -> ServerMessage {
        ServerMessage::PlayersUpdate {
            players: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_room_fan_out_reaches_only_members() {
        let broadcaster = Broadcaster::new();
        let (a, mut rx_a) = connect(&broadcaster);
        let (b, mut rx_b) = connect(&broadcaster);
        let (_c, mut rx_c) = connect(&broadcaster);
        broadcaster.subscribe("r1", a);
        broadcaster.subscribe("r1", b);

        broadcaster.send_to_room("r1", &players(&["alice", "bob"]));

        assert!(matches!(rx_a.try_recv(), Ok(ServerMessage::PlayersUpdate { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(ServerMessage::PlayersUpdate { .. })));
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn test_send_to_room_except_skips_sender() {
        let broadcaster = Broadcaster::new();
        let (a, mut rx_a) = connect(&broadcaster);
        let (b, mut rx_b) = connect(&broadcaster);
        broadcaster.subscribe("r1", a);
        broadcaster.subscribe("r1", b);

        broadcaster.send_to_room_except("r1", a, &players(&[]));

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_send_to_all_and_unregister() {
        let broadcaster = Broadcaster::new();
        let (a, mut rx_a) = connect(&broadcaster);
        let (b, mut rx_b) = connect(&broadcaster);
        broadcaster.subscribe("r1", a);
        broadcaster.unregister(a);

        broadcaster.send_to_all(&players(&[]));
        broadcaster.send_to_room("r1", &players(&[]));

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
        assert_eq!(broadcaster.connection_count(), 1);
        broadcaster.send_to(b, players(&["x"]));
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_disconnects_instead_of_dropping() {
        let broadcaster = Broadcaster::new();
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(1);
        broadcaster.register(id, tx);
        broadcaster.subscribe("r1", id);
        let (other, mut rx_other) = connect(&broadcaster);
        broadcaster.subscribe("r1", other);

        broadcaster.send_to(id, players(&["first"]));
        broadcaster.send_to_room("r1", &players(&["second"]));

        match rx.try_recv() {
            Ok(ServerMessage::PlayersUpdate { players }) => assert_eq!(players, vec!["first"]),
            other => panic!("unexpected {:?}", other),
        }
        // Closed rather than silently missing "second"
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Disconnected)));
        assert_eq!(broadcaster.connection_count(), 1);
        assert!(rx_other.try_recv().is_ok());

        broadcaster.send_to_room("r1", &players(&["third"]));
        assert!(rx_other.try_recv().is_ok());
    }

    #[test]
    fn test_closed_room_gets_no_messages() {
        let broadcaster = Broadcaster::new();
        let (a, mut rx_a) = connect(&broadcaster);
        broadcaster.subscribe("r1", a);
        broadcaster.close_room("r1");

        broadcaster.send_to_room("r1", &players(&[]));
        assert!(rx_a.try_recv().is_err());
    }
}
