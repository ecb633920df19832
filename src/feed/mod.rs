//! Realtime feed: per-game ordered publication of committed documents.
//!
//! Decoupled from the mutation path: the flow service publishes after every
//! successful commit, subscribers receive full `GameState` documents in
//! version order. Delivery is monotonic per game — if two publishes race,
//! the older version is dropped rather than delivered out of order, and
//! subscribers converge on the latest committed document.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::debug;
use uuid::Uuid;

use crate::domain::GameState;

pub struct GameFeed {
    capacity: usize,
    channels: DashMap<Uuid, broadcast::Sender<Arc<GameState>>>,
    last_published: Mutex<HashMap<Uuid, u64>>,
}

impl GameFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: DashMap::new(),
            last_published: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, game_id: Uuid) -> broadcast::Sender<Arc<GameState>> {
        self.channels
            .entry(game_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Subscribe to a game's committed documents. Slow consumers that fall
    /// more than `capacity` versions behind observe a lag error and then
    /// resume from the live edge.
    pub fn subscribe(&self, game_id: Uuid) -> BroadcastStream<Arc<GameState>> {
        BroadcastStream::new(self.sender(game_id).subscribe())
    }

    /// Publish a committed document to the game's subscribers.
    pub fn publish(&self, state: &GameState) {
        let game_id = state.game_id;
        // The lock is held across the send so versions leave in order.
        let mut last = self.last_published.lock();
        let entry = last.entry(game_id).or_insert(0);
        if state.version <= *entry {
            debug!(
                %game_id,
                version = state.version,
                last_published = *entry,
                "Dropping stale publish"
            );
            return;
        }
        *entry = state.version;

        if let Some(sender) = self.channels.get(&game_id) {
            // No receivers is fine; the document is durably in the store.
            let _ = sender.send(Arc::new(state.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio_stream::StreamExt;

    use super::*;
    use crate::domain::test_state_helpers::waiting_game;

    #[tokio::test]
    async fn subscribers_receive_documents_in_version_order() {
        let feed = GameFeed::new(16);
        let state = waiting_game(2);
        let mut stream = feed.subscribe(state.game_id);

        for version in 1..=3u64 {
            let mut doc = state.clone();
            doc.version = version;
            feed.publish(&doc);
        }

        for expected in 1..=3u64 {
            let received = stream.next().await.unwrap().unwrap();
            assert_eq!(received.version, expected);
        }
    }

    #[tokio::test]
    async fn stale_versions_are_dropped() {
        let feed = GameFeed::new(16);
        let state = waiting_game(2);
        let mut stream = feed.subscribe(state.game_id);

        let mut doc = state.clone();
        doc.version = 5;
        feed.publish(&doc);
        doc.version = 4;
        feed.publish(&doc);
        doc.version = 6;
        feed.publish(&doc);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.version, 5);
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.version, 6);
    }

    #[tokio::test]
    async fn games_are_isolated() {
        let feed = GameFeed::new(16);
        let a = waiting_game(2);
        let mut b = waiting_game(2);
        b.game_id = Uuid::from_u128(0xB);

        let mut stream_b = feed.subscribe(b.game_id);
        let mut doc = a.clone();
        doc.version = 2;
        feed.publish(&doc);
        b.version = 7;
        feed.publish(&b);

        let received = stream_b.next().await.unwrap().unwrap();
        assert_eq!(received.game_id, b.game_id);
        assert_eq!(received.version, 7);
    }
}
