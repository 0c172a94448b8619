//! Capabilities the virtual tabletop host provides.
//!
//! The host owns player identity, a shared room key/value store, a broadcast
//! bus, and the map's scene items. Services receive these as an injected
//! [`Host`] rather than reaching for a global SDK object.
//!
//! The metadata store is eventually consistent: `set_metadata` merges keys
//! with last-write-wins per key and no atomicity across keys.

pub mod memory;

pub use memory::{MemoryHost, MemoryRoom};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::HostResult;

/// A snapshot of room metadata, or a partial update to merge into it.
pub type Metadata = serde_json::Map<String, Value>;

/// Receiver for room metadata snapshots after each write.
pub type MetadataStream = broadcast::Receiver<Metadata>;

/// Receiver for raw broadcast payloads on one channel.
pub type MessageStream = broadcast::Receiver<Value>;

/// A player's role in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The game master.
    #[serde(rename = "GM")]
    GameMaster,
    /// Any other player.
    #[serde(rename = "PLAYER")]
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameMaster => write!(f, "GM"),
            Self::Player => write!(f, "PLAYER"),
        }
    }
}

/// A connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Host-assigned player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role in the room.
    pub role: Role,
}

impl Player {
    /// A player with the given role.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Returns true if the player is the GM.
    pub fn is_gm(&self) -> bool {
        self.role == Role::GameMaster
    }
}

/// Kind of a scene item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    /// An image; character tokens are images.
    Image,
    /// A drawn shape.
    Shape,
    /// A text label.
    Text,
}

/// An item on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneItem {
    /// Item id.
    pub id: String,
    /// Item name; may be empty.
    pub name: String,
    /// Item kind.
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// Item metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl SceneItem {
    /// An item with empty metadata.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            metadata: Metadata::new(),
        }
    }
}

/// The shared room key/value store.
#[async_trait]
pub trait RoomMetadata: Send + Sync {
    /// Read the whole store.
    async fn get_metadata(&self) -> HostResult<Metadata>;

    /// Merge `update` into the store. A `null` value clears the key.
    async fn set_metadata(&self, update: Metadata) -> HostResult<()>;

    /// Receive the full store after every successful write.
    async fn subscribe_metadata(&self) -> MetadataStream;
}

/// Best-effort fan-out messaging between clients.
#[async_trait]
pub trait BroadcastBus: Send + Sync {
    /// Send a payload to every subscriber of `channel`.
    async fn send(&self, channel: &str, message: Value) -> HostResult<()>;

    /// Receive payloads sent on `channel`.
    async fn subscribe(&self, channel: &str) -> MessageStream;
}

/// Player identity.
#[async_trait]
pub trait Party: Send + Sync {
    /// The player this client belongs to.
    async fn current_player(&self) -> HostResult<Player>;

    /// Other players as the host lists them. The GM may be missing.
    async fn party_players(&self) -> HostResult<Vec<Player>>;
}

/// The map's items and the current player's selection.
#[async_trait]
pub trait SceneItems: Send + Sync {
    /// Ids the current player has selected.
    async fn selection(&self) -> HostResult<Vec<String>>;

    /// Items with the given ids; unknown ids are skipped.
    async fn items(&self, ids: &[String]) -> HostResult<Vec<SceneItem>>;

    /// Replace an item's metadata.
    async fn set_item_metadata(&self, id: &str, metadata: Metadata) -> HostResult<()>;
}

/// Everything a scene service may call on the host.
pub trait Host: RoomMetadata + BroadcastBus + Party + SceneItems {}

impl<T: RoomMetadata + BroadcastBus + Party + SceneItems> Host for T {}
