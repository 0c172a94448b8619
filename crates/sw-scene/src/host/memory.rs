//! In-memory host.
//!
//! A [`MemoryRoom`] holds the shared state of one room. Each client joins
//! it as a [`MemoryHost`] bound to one player, so several clients can act on
//! the same room the way connected players do. Writes and broadcasts can be
//! made to fail on demand to exercise partial-failure paths.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use super::{
    BroadcastBus, MessageStream, Metadata, MetadataStream, Party, Player, RoomMetadata,
    SceneItem, SceneItems,
};
use crate::error::{HostError, HostResult};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct RoomState {
    metadata: Metadata,
    party: Vec<Player>,
    items: Vec<SceneItem>,
    selections: HashMap<String, Vec<String>>,
    channels: HashMap<String, broadcast::Sender<Value>>,
    failing_writes: u32,
    failing_broadcasts: u32,
}

/// Shared state of one in-memory room.
#[derive(Clone)]
pub struct MemoryRoom {
    state: Arc<RwLock<RoomState>>,
    changes: broadcast::Sender<Metadata>,
}

impl Default for MemoryRoom {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(RoomState::default())),
            changes,
        }
    }
}

impl MemoryRoom {
    /// An empty room.
    pub fn new() -> Self {
        Self::default()
    }

    /// Join as `player`, listed in the party.
    pub async fn join(&self, player: Player) -> MemoryHost {
        {
            let mut state = self.state.write().await;
            state.party.retain(|p| p.id != player.id);
            state.party.push(player.clone());
        }
        tracing::debug!(player = %player.id, "joined room");
        self.client(player)
    }

    /// Join as `player` without appearing in the party list, the way the
    /// host sometimes omits the GM.
    pub fn join_unlisted(&self, player: Player) -> MemoryHost {
        self.client(player)
    }

    fn client(&self, player: Player) -> MemoryHost {
        MemoryHost {
            room: self.clone(),
            player,
        }
    }

    /// Remove a player from the party list.
    pub async fn leave(&self, player_id: &str) {
        self.state.write().await.party.retain(|p| p.id != player_id);
    }

    /// Put an item on the map.
    pub async fn add_item(&self, item: SceneItem) {
        let mut state = self.state.write().await;
        state.items.retain(|i| i.id != item.id);
        state.items.push(item);
    }

    /// Take an item off the map.
    pub async fn remove_item(&self, id: &str) {
        self.state.write().await.items.retain(|i| i.id != id);
    }

    /// An item by id.
    pub async fn item(&self, id: &str) -> Option<SceneItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    /// Reject the next `n` metadata writes.
    pub async fn fail_next_writes(&self, n: u32) {
        self.state.write().await.failing_writes = n;
    }

    /// Reject the next `n` broadcasts.
    pub async fn fail_next_broadcasts(&self, n: u32) {
        self.state.write().await.failing_broadcasts = n;
    }

    /// A copy of the room metadata.
    pub async fn metadata(&self) -> Metadata {
        self.state.read().await.metadata.clone()
    }

    async fn merge(&self, update: Metadata) -> HostResult<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            if state.failing_writes > 0 {
                state.failing_writes -= 1;
                return Err(HostError::WriteRejected("injected failure".to_string()));
            }
            for (key, value) in update {
                if value.is_null() {
                    state.metadata.remove(&key);
                } else {
                    state.metadata.insert(key, value);
                }
            }
            state.metadata.clone()
        };
        // No subscribers is not an error.
        let _ = self.changes.send(snapshot);
        Ok(())
    }
}

/// One client's view of a [`MemoryRoom`].
#[derive(Clone)]
pub struct MemoryHost {
    room: MemoryRoom,
    player: Player,
}

impl MemoryHost {
    /// The shared room.
    pub fn room(&self) -> &MemoryRoom {
        &self.room
    }

    /// The player this client belongs to.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Set this client's map selection.
    pub async fn select(&self, ids: &[&str]) {
        let ids = ids.iter().map(|id| id.to_string()).collect();
        self.room
            .state
            .write()
            .await
            .selections
            .insert(self.player.id.clone(), ids);
    }
}

#[async_trait]
impl RoomMetadata for MemoryHost {
    async fn get_metadata(&self) -> HostResult<Metadata> {
        Ok(self.room.metadata().await)
    }

    async fn set_metadata(&self, update: Metadata) -> HostResult<()> {
        self.room.merge(update).await
    }

    async fn subscribe_metadata(&self) -> MetadataStream {
        self.room.changes.subscribe()
    }
}

#[async_trait]
impl BroadcastBus for MemoryHost {
    async fn send(&self, channel: &str, message: Value) -> HostResult<()> {
        let mut state = self.room.state.write().await;
        if state.failing_broadcasts > 0 {
            state.failing_broadcasts -= 1;
            return Err(HostError::BroadcastFailed("injected failure".to_string()));
        }
        if let Some(sender) = state.channels.get(channel) {
            let _ = sender.send(message);
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> MessageStream {
        let mut state = self.room.state.write().await;
        state
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }
}

#[async_trait]
impl Party for MemoryHost {
    async fn current_player(&self) -> HostResult<Player> {
        Ok(self.player.clone())
    }

    async fn party_players(&self) -> HostResult<Vec<Player>> {
        Ok(self.room.state.read().await.party.clone())
    }
}

#[async_trait]
impl SceneItems for MemoryHost {
    async fn selection(&self) -> HostResult<Vec<String>> {
        let state = self.room.state.read().await;
        Ok(state
            .selections
            .get(&self.player.id)
            .cloned()
            .unwrap_or_default())
    }

    async fn items(&self, ids: &[String]) -> HostResult<Vec<SceneItem>> {
        let state = self.room.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn set_item_metadata(&self, id: &str, metadata: Metadata) -> HostResult<()> {
        let mut state = self.room.state.write().await;
        let item = state
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| HostError::Unavailable(format!("no item {id}")))?;
        item.metadata = metadata;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ItemKind, Role};
    use serde_json::json;

    fn update(key: &str, value: Value) -> Metadata {
        let mut m = Metadata::new();
        m.insert(key.to_string(), value);
        m
    }

    #[tokio::test]
    async fn merge_and_clear() {
        let room = MemoryRoom::new();
        let host = room.join(Player::new("p1", "Ann", Role::Player)).await;
        host.set_metadata(update("a", json!(1))).await.unwrap();
        host.set_metadata(update("b", json!(2))).await.unwrap();
        host.set_metadata(update("a", Value::Null)).await.unwrap();
        let meta = host.get_metadata().await.unwrap();
        assert!(meta.get("a").is_none());
        assert_eq!(meta["b"], json!(2));
    }

    #[tokio::test]
    async fn injected_write_failure() {
        let room = MemoryRoom::new();
        let host = room.join(Player::new("p1", "Ann", Role::Player)).await;
        room.fail_next_writes(1).await;
        assert!(host.set_metadata(update("a", json!(1))).await.is_err());
        assert!(host.set_metadata(update("a", json!(1))).await.is_ok());
    }

    #[tokio::test]
    async fn changes_reach_subscribers() {
        let room = MemoryRoom::new();
        let writer = room.join(Player::new("p1", "Ann", Role::Player)).await;
        let reader = room.join(Player::new("p2", "Bo", Role::Player)).await;
        let mut changes = reader.subscribe_metadata().await;
        writer.set_metadata(update("a", json!(true))).await.unwrap();
        let snapshot = changes.recv().await.unwrap();
        assert_eq!(snapshot["a"], json!(true));
    }

    #[tokio::test]
    async fn broadcast_fan_out() {
        let room = MemoryRoom::new();
        let a = room.join(Player::new("p1", "Ann", Role::Player)).await;
        let b = room.join(Player::new("p2", "Bo", Role::Player)).await;
        let mut rx_a = a.subscribe("rolls").await;
        let mut rx_b = b.subscribe("rolls").await;
        a.send("rolls", json!({"n": 1})).await.unwrap();
        assert_eq!(rx_a.recv().await.unwrap(), json!({"n": 1}));
        assert_eq!(rx_b.recv().await.unwrap(), json!({"n": 1}));
    }

    #[tokio::test]
    async fn unlisted_gm_is_not_in_party() {
        let room = MemoryRoom::new();
        let gm = room.join_unlisted(Player::new("gm", "Gail", Role::GameMaster));
        room.join(Player::new("p1", "Ann", Role::Player)).await;
        let party = gm.party_players().await.unwrap();
        assert_eq!(party.len(), 1);
        assert!(gm.current_player().await.unwrap().is_gm());
    }

    #[tokio::test]
    async fn selection_and_items() {
        let room = MemoryRoom::new();
        let host = room.join(Player::new("p1", "Ann", Role::Player)).await;
        room.add_item(SceneItem::new("t1", "Ann's token", ItemKind::Image)).await;
        host.select(&["t1"]).await;
        let selection = host.selection().await.unwrap();
        assert_eq!(selection, vec!["t1".to_string()]);
        let items = host.items(&selection).await.unwrap();
        assert_eq!(items[0].name, "Ann's token");
        assert!(host.set_item_metadata("missing", Metadata::new()).await.is_err());
    }
}
